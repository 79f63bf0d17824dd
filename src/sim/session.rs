/// GameSession: turns GameState's discrete events into a running clock.
///
/// The session owns the only `Scheduler`, so it is the only thing that
/// runs periodic work: the startup delay, the one-second quarter tick and
/// the one-second inter-quarter pause countdown. It listens to four of
/// GameState's events and relays presentation-ready values outward.
///
/// Ownership on `new_game`: the old GameState is unsubscribed and every
/// pending timer is cancelled before the replacement is built, all inside
/// one `&mut self` call. Timer handles are compared by value when they
/// fire, so a tick that outlived its quarter cancels itself and does
/// nothing else.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::error::{ConfigError, ScoreRejected};
use crate::domain::game_config::GameConfiguration;
use crate::domain::team::{Team, Winner};
use super::event::{EventKind, GameEvent};
use super::presentation::{Presentation, QuarterLabel};
use super::schedule::{ScheduleHandle, Scheduler, Task};
use super::state::{DeferredAdvance, GameState};

#[derive(Clone, Copy, Debug)]
pub struct SessionTiming {
    /// Period of both the quarter clock and the pause countdown.
    pub tick: Duration,
    /// Delay between `GameStarted` and the first quarter.
    pub start_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        SessionTiming {
            tick: Duration::from_secs(1),
            start_delay: Duration::from_millis(50),
        }
    }
}

/// What the session is doing, derived from GameState and the pause timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionPhase {
    Idle,
    Starting,
    QuarterRunning,
    InterQuarterPause,
    GameOver,
}

/// Everything the event handlers touch. Shared between the session and
/// the closures registered on the current GameState.
struct Wiring<P> {
    presentation: P,
    scheduler: Scheduler,
    timing: SessionTiming,
    now: Duration,
    quarter_tick: Option<ScheduleHandle>,
    pause_tick: Option<ScheduleHandle>,
    pause_remaining: u32,
    cues: Vec<GameEvent>,
}

impl<P: Presentation> Wiring<P> {
    fn on_game_started(&mut self) {
        self.presentation.reset_display();
        self.presentation.reset_winner_display();
        self.presentation.hide_pause_indicator();
        self.cues.push(GameEvent::GameStarted);
    }

    fn on_quarter_started(&mut self, quarter: u32, duration: u32) {
        self.presentation.clear_error();
        self.presentation.set_quarter_label(QuarterLabel::Number(quarter));
        self.presentation.set_clock(duration);

        if let Some(old) = self.quarter_tick.take() {
            self.scheduler.cancel(old);
        }
        let handle = self.scheduler.schedule_repeating(self.now, self.timing.tick, Task::QuarterTick);
        self.quarter_tick = Some(handle);
        self.cues.push(GameEvent::QuarterStarted { quarter, duration });
    }

    fn on_quarter_ended(&mut self, pause_duration: u32) {
        self.cues.push(GameEvent::QuarterEnded { pause_duration });

        if let Some(old) = self.pause_tick.take() {
            self.scheduler.cancel(old);
        }
        if pause_duration == 0 {
            self.scheduler.schedule_once(self.now, Duration::ZERO, Task::NextQuarter);
            return;
        }

        self.presentation.show_pause_indicator();
        self.presentation.set_pause_remaining(pause_duration);
        self.pause_remaining = pause_duration;
        let handle = self.scheduler.schedule_repeating(self.now, self.timing.tick, Task::PauseTick);
        self.pause_tick = Some(handle);
    }

    fn on_game_ended(&mut self, winner: Winner) {
        self.presentation.announce_winner(winner);
        self.cues.push(GameEvent::GameEnded { winner });
    }

    fn pop_due(&mut self, now: Duration) -> Option<(ScheduleHandle, Task)> {
        let (handle, task, due) = self.scheduler.pop_due(now)?;
        self.now = self.now.max(due);
        Some((handle, task))
    }

    fn stop_quarter_tick(&mut self, handle: ScheduleHandle) {
        self.scheduler.cancel(handle);
        if self.quarter_tick == Some(handle) {
            self.quarter_tick = None;
        }
    }

    fn stop_pause_tick(&mut self, handle: ScheduleHandle) {
        self.scheduler.cancel(handle);
        if self.pause_tick == Some(handle) {
            self.pause_tick = None;
        }
    }

    fn reset_timers(&mut self) {
        self.scheduler.cancel_all();
        self.quarter_tick = None;
        self.pause_tick = None;
        self.pause_remaining = 0;
    }
}

pub struct GameSession<P: Presentation + 'static> {
    state: Option<GameState>,
    wiring: Rc<RefCell<Wiring<P>>>,
}

impl<P: Presentation + 'static> GameSession<P> {
    pub fn new(presentation: P, timing: SessionTiming) -> Self {
        GameSession {
            state: None,
            wiring: Rc::new(RefCell::new(Wiring {
                presentation,
                scheduler: Scheduler::new(),
                timing,
                now: Duration::ZERO,
                quarter_tick: None,
                pause_tick: None,
                pause_remaining: 0,
                cues: Vec::new(),
            })),
        }
    }

    // ── Input ──

    /// Validate the three operator fields and start a game from them.
    /// A rejected configuration is reported and leaves any running game
    /// alone.
    pub fn request_new_game(&mut self, quarters: &str, duration: &str, pause: &str) -> Result<(), ConfigError> {
        match GameConfiguration::parse_fields(quarters, duration, pause) {
            Ok(config) => {
                self.new_game(config);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "new game rejected");
                self.wiring.borrow_mut().presentation.show_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the current game (if any) with a fresh one.
    #[instrument(skip(self))]
    pub fn new_game(&mut self, config: GameConfiguration) {
        if let Some(mut old) = self.state.take() {
            debug!(quarter = old.current_quarter(), "discarding previous game");
            old.unsubscribe_all();
        }
        self.wiring.borrow_mut().reset_timers();

        let mut state = GameState::new(config);
        self.wire(&mut state);
        let DeferredAdvance = state.start();
        self.state = Some(state);

        let mut w = self.wiring.borrow_mut();
        let (now, delay) = (w.now, w.timing.start_delay);
        w.scheduler.schedule_once(now, delay, Task::OpenFirstQuarter);
    }

    #[instrument(skip(self))]
    pub fn increment_score(&mut self, team: Team, points: u32) -> Result<u32, ScoreRejected> {
        let result = match self.state.as_mut() {
            _ if points == 0 => Err(ScoreRejected::ZeroPoints),
            None => Err(ScoreRejected::NoGame),
            Some(s) if s.is_over_now() => Err(ScoreRejected::GameOver),
            Some(s) if s.is_paused_now() => Err(ScoreRejected::Paused),
            Some(s) => Ok(s.add_score(team, points)),
        };

        let mut w = self.wiring.borrow_mut();
        match result {
            Ok(total) => {
                info!(%team, points, total, "score");
                w.presentation.set_score(team, total);
            }
            Err(e) => {
                warn!(%team, points, reason = %e, "score rejected");
                w.presentation.show_error(&e.to_string());
            }
        }
        result
    }

    // ── Clock ──

    /// Run every timer due at or before `now` (time since session creation).
    pub fn advance(&mut self, now: Duration) {
        loop {
            let fired = self.wiring.borrow_mut().pop_due(now);
            let Some((handle, task)) = fired else { break };
            self.run(handle, task);
        }
        let mut w = self.wiring.borrow_mut();
        w.now = w.now.max(now);
    }

    // ── Queries ──

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            None => SessionPhase::Idle,
            Some(s) if s.is_over_now() => SessionPhase::GameOver,
            Some(s) if s.current_quarter() == 0 => SessionPhase::Starting,
            Some(s) if !s.is_paused_now() => SessionPhase::QuarterRunning,
            Some(_) => SessionPhase::InterQuarterPause,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn presentation(&self) -> Ref<'_, P> {
        Ref::map(self.wiring.borrow(), |w| &w.presentation)
    }

    /// Events the session reacted to since the last call, oldest first.
    pub fn take_cues(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.wiring.borrow_mut().cues)
    }

    // ── Internal ──

    fn wire(&self, state: &mut GameState) {
        let w = Rc::clone(&self.wiring);
        state.subscribe(EventKind::GameStarted, Box::new(move |_: &GameEvent| {
            w.borrow_mut().on_game_started();
        }));

        let w = Rc::clone(&self.wiring);
        state.subscribe(EventKind::QuarterStarted, Box::new(move |e: &GameEvent| {
            if let GameEvent::QuarterStarted { quarter, duration } = *e {
                w.borrow_mut().on_quarter_started(quarter, duration);
            }
        }));

        let w = Rc::clone(&self.wiring);
        state.subscribe(EventKind::QuarterEnded, Box::new(move |e: &GameEvent| {
            if let GameEvent::QuarterEnded { pause_duration } = *e {
                w.borrow_mut().on_quarter_ended(pause_duration);
            }
        }));

        let w = Rc::clone(&self.wiring);
        state.subscribe(EventKind::GameEnded, Box::new(move |e: &GameEvent| {
            if let GameEvent::GameEnded { winner } = *e {
                w.borrow_mut().on_game_ended(winner);
            }
        }));
    }

    fn run(&mut self, handle: ScheduleHandle, task: Task) {
        match task {
            Task::OpenFirstQuarter | Task::NextQuarter => {
                if let Some(state) = self.state.as_mut() {
                    state.advance_quarter();
                }
            }
            Task::QuarterTick => self.run_quarter_tick(handle),
            Task::PauseTick => self.run_pause_tick(handle),
        }
    }

    fn run_quarter_tick(&mut self, handle: ScheduleHandle) {
        let stale = self.wiring.borrow().quarter_tick != Some(handle);
        let live = self.state.as_mut().filter(|s| !s.is_over_now());
        let state = match live {
            Some(s) if !stale => s,
            _ => {
                self.wiring.borrow_mut().stop_quarter_tick(handle);
                return;
            }
        };

        // No wiring borrow may be held here: tick() can emit into the handlers.
        let remaining = state.tick();

        let mut w = self.wiring.borrow_mut();
        w.presentation.set_clock(remaining);
        if remaining == 0 {
            w.stop_quarter_tick(handle);
        }
    }

    fn run_pause_tick(&mut self, handle: ScheduleHandle) {
        let finished = {
            let mut w = self.wiring.borrow_mut();
            if w.pause_tick != Some(handle) {
                w.stop_pause_tick(handle);
                return;
            }
            w.pause_remaining = w.pause_remaining.saturating_sub(1);
            let remaining = w.pause_remaining;
            w.presentation.set_pause_remaining(remaining);
            debug!(remaining, "pause tick");
            if remaining == 0 {
                w.stop_pause_tick(handle);
                w.presentation.hide_pause_indicator();
            }
            remaining == 0
        };

        if finished {
            if let Some(state) = self.state.as_mut() {
                state.advance_quarter();
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Reset,
        ClearError,
        Error(String),
        Quarter(QuarterLabel),
        Clock(u32),
        Score(Team, u32),
        Fouls(Team, u32),
        ShowPause,
        HidePause,
        PauseRemaining(u32),
        Winner(Winner),
        ResetWinner,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Presentation for Recorder {
        fn reset_display(&mut self) { self.calls.push(Call::Reset); }
        fn clear_error(&mut self) { self.calls.push(Call::ClearError); }
        fn show_error(&mut self, message: &str) { self.calls.push(Call::Error(message.into())); }
        fn set_quarter_label(&mut self, quarter: QuarterLabel) { self.calls.push(Call::Quarter(quarter)); }
        fn set_clock(&mut self, seconds: u32) { self.calls.push(Call::Clock(seconds)); }
        fn set_score(&mut self, team: Team, value: u32) { self.calls.push(Call::Score(team, value)); }
        fn set_fouls(&mut self, team: Team, value: u32) { self.calls.push(Call::Fouls(team, value)); }
        fn show_pause_indicator(&mut self) { self.calls.push(Call::ShowPause); }
        fn hide_pause_indicator(&mut self) { self.calls.push(Call::HidePause); }
        fn set_pause_remaining(&mut self, seconds: u32) { self.calls.push(Call::PauseRemaining(seconds)); }
        fn announce_winner(&mut self, winner: Winner) { self.calls.push(Call::Winner(winner)); }
        fn reset_winner_display(&mut self) { self.calls.push(Call::ResetWinner); }
    }

    const DELAY: Duration = Duration::from_millis(50);

    fn secs(s: u64) -> Duration { Duration::from_secs(s) }

    fn session() -> GameSession<Recorder> {
        GameSession::new(Recorder::default(), SessionTiming::default())
    }

    fn config(quarters: u32, secs: u32, pause: u32) -> GameConfiguration {
        GameConfiguration::new(quarters, secs, pause).unwrap()
    }

    fn calls(s: &GameSession<Recorder>) -> Vec<Call> {
        s.presentation().calls.clone()
    }

    fn has(s: &GameSession<Recorder>, call: &Call) -> bool {
        s.presentation().calls.contains(call)
    }

    fn count(s: &GameSession<Recorder>, pred: impl Fn(&Call) -> bool) -> usize {
        s.presentation().calls.iter().filter(|c| pred(c)).count()
    }

    fn pending(s: &GameSession<Recorder>) -> usize {
        s.wiring.borrow().scheduler.pending()
    }

    // ── Startup ──

    #[test]
    fn new_session_is_idle() {
        let s = session();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.state().is_none());
    }

    #[test]
    fn new_game_resets_display_then_opens_first_quarter_after_delay() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        assert_eq!(calls(&s), vec![Call::Reset, Call::ResetWinner, Call::HidePause]);
        assert_eq!(s.phase(), SessionPhase::Starting);

        s.advance(DELAY - Duration::from_millis(1));
        assert_eq!(s.phase(), SessionPhase::Starting);

        s.advance(DELAY);
        assert_eq!(s.phase(), SessionPhase::QuarterRunning);
        assert!(has(&s, &Call::Quarter(QuarterLabel::Number(1))));
        assert!(has(&s, &Call::Clock(600)));
        assert_eq!(
            s.take_cues(),
            vec![GameEvent::GameStarted, GameEvent::QuarterStarted { quarter: 1, duration: 600 }]
        );
    }

    // ── Quarter clock ──

    #[test]
    fn clock_counts_down_once_per_second() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        s.advance(DELAY);
        for n in 1..=3 {
            s.advance(DELAY + secs(n));
        }
        let clocks: Vec<u32> = calls(&s).into_iter()
            .filter_map(|c| if let Call::Clock(v) = c { Some(v) } else { None })
            .collect();
        assert_eq!(clocks, vec![600, 599, 598, 597]);
    }

    #[test]
    fn quarter_end_starts_pause_countdown() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        s.advance(DELAY + secs(600));

        assert_eq!(s.phase(), SessionPhase::InterQuarterPause);
        assert!(has(&s, &Call::Clock(0)));
        assert!(has(&s, &Call::ShowPause));
        assert!(has(&s, &Call::PauseRemaining(120)));
        // only the pause countdown is left; the quarter tick cancelled itself
        assert_eq!(pending(&s), 1);
        assert!(s.take_cues().contains(&GameEvent::QuarterEnded { pause_duration: 120 }));
    }

    #[test]
    fn pause_countdown_opens_next_quarter() {
        let mut s = session();
        s.new_game(config(4, 10, 3));
        s.advance(DELAY + secs(10));
        s.advance(DELAY + secs(12));
        assert_eq!(s.phase(), SessionPhase::InterQuarterPause);
        assert!(has(&s, &Call::PauseRemaining(1)));

        s.advance(DELAY + secs(13));
        assert_eq!(s.phase(), SessionPhase::QuarterRunning);
        assert!(has(&s, &Call::PauseRemaining(0)));
        assert!(has(&s, &Call::HidePause));
        assert!(has(&s, &Call::Quarter(QuarterLabel::Number(2))));
        assert_eq!(s.state().unwrap().remaining_secs(), 10);
    }

    #[test]
    fn zero_pause_moves_straight_to_next_quarter() {
        let mut s = session();
        s.new_game(config(2, 2, 0));
        s.advance(DELAY + secs(2));
        assert_eq!(s.phase(), SessionPhase::QuarterRunning);
        assert_eq!(s.state().unwrap().current_quarter(), 2);
        assert!(!has(&s, &Call::ShowPause));
    }

    // ── Game end ──

    #[test]
    fn last_quarter_announces_winner_and_stops_timers() {
        let mut s = session();
        s.new_game(config(1, 5, 30));
        s.advance(DELAY);
        s.increment_score(Team::Home, 2).unwrap();
        s.advance(DELAY + secs(5));

        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert!(has(&s, &Call::Winner(Winner::Home)));
        assert!(!has(&s, &Call::ShowPause));
        assert_eq!(pending(&s), 0);
    }

    #[test]
    fn full_game_announces_exactly_one_winner() {
        let mut s = session();
        s.new_game(config(4, 3, 2));
        s.advance(DELAY);
        s.increment_score(Team::Guest, 3).unwrap();
        s.advance(DELAY + secs(60));

        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(count(&s, |c| matches!(c, Call::Winner(_))), 1);
        assert_eq!(count(&s, |c| matches!(c, Call::Quarter(_))), 4);
        assert!(has(&s, &Call::Winner(Winner::Guest)));
    }

    // ── Scoring guard ──

    #[test]
    fn score_while_paused_is_rejected() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        assert_eq!(s.increment_score(Team::Home, 2), Err(ScoreRejected::Paused));
        assert!(has(&s, &Call::Error("Game is paused".into())));
        assert_eq!(s.state().unwrap().score(Team::Home), 0);
        assert!(s.take_cues().iter().all(|e| *e == GameEvent::GameStarted));
    }

    #[test]
    fn score_after_game_over_is_rejected() {
        let mut s = session();
        s.new_game(config(1, 1, 0));
        s.advance(DELAY + secs(1));
        assert_eq!(s.increment_score(Team::Guest, 1), Err(ScoreRejected::GameOver));
        assert!(has(&s, &Call::Error("Game is over".into())));
    }

    #[test]
    fn score_without_game_or_points_is_rejected() {
        let mut s = session();
        assert_eq!(s.increment_score(Team::Home, 1), Err(ScoreRejected::NoGame));
        s.new_game(config(4, 600, 120));
        s.advance(DELAY);
        assert_eq!(s.increment_score(Team::Home, 0), Err(ScoreRejected::ZeroPoints));
    }

    #[test]
    fn score_during_quarter_is_forwarded() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        s.advance(DELAY);
        assert_eq!(s.increment_score(Team::Home, 2), Ok(2));
        assert_eq!(s.increment_score(Team::Home, 3), Ok(5));
        assert!(has(&s, &Call::Score(Team::Home, 5)));
    }

    #[test]
    fn quarter_start_clears_previous_error() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        let _ = s.increment_score(Team::Home, 1);
        s.advance(DELAY);
        let c = calls(&s);
        let err = c.iter().position(|c| matches!(c, Call::Error(_))).unwrap();
        let clear = c.iter().position(|c| *c == Call::ClearError).unwrap();
        assert!(clear > err);
    }

    // ── Replacement ──

    #[test]
    fn new_game_mid_quarter_discards_old_timers() {
        let mut s = session();
        s.new_game(config(4, 600, 120));
        s.advance(DELAY + secs(5));
        s.increment_score(Team::Guest, 3).unwrap();

        s.new_game(config(2, 30, 10));
        assert_eq!(pending(&s), 1);
        assert_eq!(s.state().unwrap().score(Team::Guest), 0);

        s.advance(DELAY + secs(5) + DELAY);
        assert_eq!(s.state().unwrap().remaining_secs(), 30);
        s.advance(DELAY + secs(5) + DELAY + secs(1));
        assert_eq!(s.state().unwrap().remaining_secs(), 29);
        // one quarter tick, no leftovers from the first game
        assert_eq!(pending(&s), 1);
    }

    #[test]
    fn new_game_during_pause_cancels_pause_countdown() {
        let mut s = session();
        s.new_game(config(4, 2, 60));
        s.advance(DELAY + secs(2));
        assert_eq!(s.phase(), SessionPhase::InterQuarterPause);

        s.new_game(config(4, 2, 60));
        let before = count(&s, |c| matches!(c, Call::PauseRemaining(_)));
        s.advance(DELAY + secs(2) + DELAY);
        assert_eq!(count(&s, |c| matches!(c, Call::PauseRemaining(_))), before);
        assert_eq!(s.phase(), SessionPhase::QuarterRunning);
        assert!(has(&s, &Call::HidePause));
    }

    // ── Configuration input ──

    #[test]
    fn malformed_fields_are_reported_and_ignored() {
        let mut s = session();
        let err = s.request_new_game("four", "600", "120").unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { .. }));
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(count(&s, |c| matches!(c, Call::Error(_))) == 1);
    }

    #[test]
    fn rejected_config_leaves_running_game_alone() {
        let mut s = session();
        s.request_new_game("2", "60", "5").unwrap();
        s.advance(DELAY + secs(3));
        assert_eq!(s.request_new_game("0", "60", "5"), Err(ConfigError::NoQuarters));
        assert_eq!(s.phase(), SessionPhase::QuarterRunning);
        assert_eq!(s.state().unwrap().remaining_secs(), 57);
    }
}

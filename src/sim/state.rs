/// GameState: the authoritative record of one game.
///
/// Owns scores, fouls, the quarter counter and the quarter countdown, and
/// publishes lifecycle events through its `EventBus`. It has no notion of
/// wall-clock time: something else calls `tick()` once per second and
/// performs the deferred first `advance_quarter()` requested by `start()`.
///
/// Invariants:
///   - `0 <= current_quarter <= quarter_count`
///   - `over` implies `paused`
///   - scores and fouls never decrease
///   - `remaining_secs` changes only in `tick()` (saturating at 0) and on
///     quarter start
///
/// Scoring is NOT guarded here. Callers must check `is_paused_now()` and
/// `is_over_now()` first.

use tracing::{debug, info};

use crate::domain::game_config::GameConfiguration;
use crate::domain::team::{Team, Winner};
use super::event::{EventBus, EventKind, GameEvent, Handler};

/// Returned by `start()`: the first quarter must be opened with
/// `advance_quarter()` once the startup delay has elapsed, giving
/// subscribers time to finish wiring.
#[must_use = "the first quarter never starts unless the deferred advance is scheduled"]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DeferredAdvance;

pub struct GameState {
    config: GameConfiguration,
    current_quarter: u32,
    remaining_secs: u32,
    home_score: u32,
    guest_score: u32,
    home_fouls: u32,
    guest_fouls: u32,
    paused: bool,
    over: bool,
    events: EventBus,
}

impl GameState {
    pub fn new(config: GameConfiguration) -> Self {
        GameState {
            config,
            current_quarter: 0,
            remaining_secs: 0,
            home_score: 0,
            guest_score: 0,
            home_fouls: 0,
            guest_fouls: 0,
            paused: true,
            over: false,
            events: EventBus::new(),
        }
    }

    // ── Lifecycle ──

    pub fn start(&mut self) -> DeferredAdvance {
        self.current_quarter = 0;
        self.remaining_secs = 0;
        self.home_score = 0;
        self.guest_score = 0;
        self.home_fouls = 0;
        self.guest_fouls = 0;
        self.paused = true;
        self.over = false;

        info!(
            quarters = self.config.quarter_count(),
            quarter_secs = self.config.quarter_duration_secs(),
            pause_secs = self.config.pause_duration_secs(),
            "game started"
        );
        self.events.emit(&GameEvent::GameStarted);
        DeferredAdvance
    }

    /// Open the next quarter, or end the game if the last one is done.
    pub fn advance_quarter(&mut self) {
        if self.over { return; }

        let next = self.current_quarter + 1;
        if next > self.config.quarter_count() {
            self.end();
            return;
        }

        self.current_quarter = next;
        self.remaining_secs = self.config.quarter_duration_secs();
        self.set_paused(false);

        info!(quarter = next, duration = self.remaining_secs, "quarter started");
        self.events.emit(&GameEvent::QuarterStarted {
            quarter: next,
            duration: self.remaining_secs,
        });
    }

    /// One second of quarter time. Returns the countdown for display.
    ///
    /// Reaching zero emits exactly one of `QuarterEnded` (quarters remain)
    /// or `GameEnded` (last quarter). A tick on a paused or finished game
    /// changes nothing.
    pub fn tick(&mut self) -> u32 {
        if self.paused || self.over {
            return self.remaining_secs;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        debug!(quarter = self.current_quarter, remaining = self.remaining_secs, "tick");

        if self.remaining_secs == 0 {
            if self.current_quarter < self.config.quarter_count() {
                self.set_paused(true);
                let pause_duration = self.config.pause_duration_secs();
                info!(quarter = self.current_quarter, pause_duration, "quarter ended");
                self.events.emit(&GameEvent::QuarterEnded { pause_duration });
            } else {
                self.end();
            }
        }

        self.remaining_secs
    }

    pub fn end(&mut self) -> Winner {
        self.over = true;
        self.set_paused(true);

        let winner = Winner::from_scores(self.home_score, self.guest_score);
        info!(
            home = self.home_score,
            guest = self.guest_score,
            winner = winner.as_str(),
            "game ended"
        );
        if self.events.has_subscribers(EventKind::GameEnded) {
            self.events.emit(&GameEvent::GameEnded { winner });
        }
        winner
    }

    // ── Scoring ──

    pub fn add_score(&mut self, team: Team, points: u32) -> u32 {
        let score = match team {
            Team::Home => &mut self.home_score,
            Team::Guest => &mut self.guest_score,
        };
        *score = score.saturating_add(points);
        *score
    }

    #[allow(dead_code)]
    pub fn add_foul(&mut self, team: Team) -> u32 {
        let fouls = match team {
            Team::Home => &mut self.home_fouls,
            Team::Guest => &mut self.guest_fouls,
        };
        *fouls = fouls.saturating_add(1);
        *fouls
    }

    // ── Subscriptions ──

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        self.events.subscribe(kind, handler);
    }

    pub fn unsubscribe_all(&mut self) {
        self.events.clear();
    }

    // ── Queries ──

    pub fn is_paused_now(&self) -> bool { self.paused }
    pub fn is_over_now(&self) -> bool { self.over }
    pub fn current_quarter(&self) -> u32 { self.current_quarter }
    #[allow(dead_code)]
    pub fn remaining_secs(&self) -> u32 { self.remaining_secs }
    #[allow(dead_code)]
    pub fn config(&self) -> &GameConfiguration { &self.config }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home_score,
            Team::Guest => self.guest_score,
        }
    }

    #[allow(dead_code)]
    pub fn fouls(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home_fouls,
            Team::Guest => self.guest_fouls,
        }
    }

    // ── Internal ──

    fn set_paused(&mut self, paused: bool) {
        if self.paused == paused { return; }
        self.paused = paused;
        let event = if paused { GameEvent::GamePaused } else { GameEvent::GameUnpaused };
        self.events.emit(&event);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

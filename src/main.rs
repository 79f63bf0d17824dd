/// Entry point: composition root and frame loop.
///
/// Builds the board (presentation), the keyboard reader (input) and the
/// game session, wires them together and owns their lifetime.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use tracing::{error, info};

use config::AppConfig;
use domain::error::AppError;
use sim::event::GameEvent;
use sim::session::GameSession;
use ui::board::Board;
use ui::input::{Command, ConfigForm, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(15);

fn main() {
    let (config, note) = AppConfig::load();

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: {e}");
    }
    note.log();

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };
    let mut session = GameSession::new(Board::new(), config.timing);
    let mut form = ConfigForm::new(&config.game);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = run(&mut session, &mut form, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "scoreboard stopped");
        eprintln!("Scoreboard error: {e}");
    }

    let board = session.presentation();
    println!("Final score: home {} - guest {}", board.home_score, board.guest_score);
}

fn run(
    session: &mut GameSession<Board>,
    form: &mut ConfigForm,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), AppError> {
    let mut input = InputState::new();
    let started = Instant::now();
    info!("scoreboard ready");

    loop {
        for &cmd in input.drain_events()? {
            if handle_command(cmd, session, form, sound) {
                return Ok(());
            }
        }

        session.advance(started.elapsed());
        process_sound_cues(sound, &session.take_cues());

        let phase = session.phase();
        renderer.render(&session.presentation(), form, phase)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

/// Apply one input command. Returns true when the operator asked to quit.
fn handle_command(
    cmd: Command,
    session: &mut GameSession<Board>,
    form: &mut ConfigForm,
    sound: Option<&SoundEngine>,
) -> bool {
    match cmd {
        Command::Quit => return true,
        Command::Score(team, points) => {
            if session.increment_score(team, points).is_ok() {
                if let Some(sfx) = sound { sfx.play_blip(); }
            }
        }
        Command::NewGame => {
            let (q, d, p) = form.values();
            // A rejection has already been shown on the board.
            let _ = session.request_new_game(q, d, p);
        }
        Command::FocusNext => form.focus_next(),
        Command::Digit(c) => form.push_digit(c),
        Command::Erase => form.erase(),
    }
    false
}

fn process_sound_cues(sound: Option<&SoundEngine>, cues: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for cue in cues {
        match cue {
            GameEvent::QuarterStarted { .. } => sfx.play_whistle(),
            GameEvent::QuarterEnded { .. } | GameEvent::GameEnded { .. } => sfx.play_horn(),
            _ => {}
        }
    }
}

/// Keyboard input: terminal events → scoreboard commands.
///
/// All pending terminal events are drained once per frame. Only Press and
/// Repeat events count; Release events (sent by terminals with keyboard
/// enhancement) are ignored.
///
/// Key map:
///   Q / W / E      home +1 / +2 / +3
///   I / O / P      guest +1 / +2 / +3
///   Tab            next config field
///   0-9, Backspace edit the focused field
///   Enter          new game from the three fields
///   Esc, Ctrl+C    quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::GameDefaults;
use crate::domain::team::Team;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    Score(Team, u32),
    NewGame,
    FocusNext,
    Digit(char),
    Erase,
}

pub struct InputState {
    /// Commands decoded during the most recent `drain_events()`.
    commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { commands: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    pub fn drain_events(&mut self) -> std::io::Result<&[Command]> {
        self.commands.clear();
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(cmd) = command_for(key) {
                    self.commands.push(cmd);
                }
            }
        }
        Ok(self.commands.as_slice())
    }
}

/// Decode one key event. `None` for keys with no binding.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Quit),
            _ => None,
        };
    }

    let cmd = match key.code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Enter => Command::NewGame,
        KeyCode::Tab => Command::FocusNext,
        KeyCode::Backspace => Command::Erase,
        KeyCode::Char(c) if c.is_ascii_digit() => Command::Digit(c),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Command::Score(Team::Home, 1),
            'w' => Command::Score(Team::Home, 2),
            'e' => Command::Score(Team::Home, 3),
            'i' => Command::Score(Team::Guest, 1),
            'o' => Command::Score(Team::Guest, 2),
            'p' => Command::Score(Team::Guest, 3),
            _ => return None,
        },
        _ => return None,
    };
    Some(cmd)
}

// ── Config form ──

pub const FIELD_LABELS: [&str; 3] = ["Quarters", "Quarter (s)", "Timeout (s)"];

/// Longest value a field accepts; anything longer would overflow `u32`.
const FIELD_MAX_LEN: usize = 9;

/// The three new-game fields the operator edits before pressing Enter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigForm {
    pub fields: [String; 3],
    pub focus: usize,
}

impl ConfigForm {
    pub fn new(defaults: &GameDefaults) -> Self {
        ConfigForm {
            fields: [
                defaults.quarters.to_string(),
                defaults.quarter_seconds.to_string(),
                defaults.pause_seconds.to_string(),
            ],
            focus: 0,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn push_digit(&mut self, c: char) {
        let field = &mut self.fields[self.focus];
        if field.len() < FIELD_MAX_LEN {
            field.push(c);
        }
    }

    pub fn erase(&mut self) {
        self.fields[self.focus].pop();
    }

    pub fn values(&self) -> (&str, &str, &str) {
        (&self.fields[0], &self.fields[1], &self.fields[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn defaults() -> GameDefaults {
        GameDefaults { quarters: 4, quarter_seconds: 600, pause_seconds: 120 }
    }

    #[test]
    fn score_keys_map_to_teams() {
        assert_eq!(command_for(press(KeyCode::Char('q'))), Some(Command::Score(Team::Home, 1)));
        assert_eq!(command_for(press(KeyCode::Char('E'))), Some(Command::Score(Team::Home, 3)));
        assert_eq!(command_for(press(KeyCode::Char('o'))), Some(Command::Score(Team::Guest, 2)));
    }

    #[test]
    fn ctrl_c_and_esc_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c), Some(Command::Quit));
        assert_eq!(command_for(press(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(command_for(key), None);
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(command_for(press(KeyCode::Char('z'))), None);
        assert_eq!(command_for(press(KeyCode::F(1))), None);
    }

    #[test]
    fn form_starts_from_defaults() {
        let form = ConfigForm::new(&defaults());
        assert_eq!(form.values(), ("4", "600", "120"));
    }

    #[test]
    fn form_edits_focused_field() {
        let mut form = ConfigForm::new(&defaults());
        form.focus_next();
        form.erase();
        form.erase();
        form.push_digit('3');
        assert_eq!(form.values(), ("4", "63", "120"));
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn form_caps_field_length() {
        let mut form = ConfigForm::new(&defaults());
        for _ in 0..20 {
            form.push_digit('9');
        }
        assert_eq!(form.fields[0].len(), FIELD_MAX_LEN);
    }
}

/// Board: the display model behind the terminal scoreboard.
///
/// Implements `Presentation` by storing each pushed value; the renderer
/// reads it back every frame.

use crate::domain::team::{Team, Winner};
use crate::sim::presentation::{Presentation, QuarterLabel};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    pub quarter: QuarterLabel,
    pub clock: u32,
    pub home_score: u32,
    pub guest_score: u32,
    pub home_fouls: u32,
    pub guest_fouls: u32,
    pub pause_visible: bool,
    pub pause_remaining: u32,
    pub winner: Option<Winner>,
    pub error: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home_score,
            Team::Guest => self.guest_score,
        }
    }

    pub fn fouls(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home_fouls,
            Team::Guest => self.guest_fouls,
        }
    }
}

impl Presentation for Board {
    fn reset_display(&mut self) {
        self.quarter = QuarterLabel::Blank;
        self.clock = 0;
        self.home_score = 0;
        self.guest_score = 0;
        self.home_fouls = 0;
        self.guest_fouls = 0;
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn set_quarter_label(&mut self, quarter: QuarterLabel) {
        self.quarter = quarter;
    }

    fn set_clock(&mut self, seconds: u32) {
        self.clock = seconds;
    }

    fn set_score(&mut self, team: Team, value: u32) {
        match team {
            Team::Home => self.home_score = value,
            Team::Guest => self.guest_score = value,
        }
    }

    fn set_fouls(&mut self, team: Team, value: u32) {
        match team {
            Team::Home => self.home_fouls = value,
            Team::Guest => self.guest_fouls = value,
        }
    }

    fn show_pause_indicator(&mut self) {
        self.pause_visible = true;
    }

    fn hide_pause_indicator(&mut self) {
        self.pause_visible = false;
    }

    fn set_pause_remaining(&mut self, seconds: u32) {
        self.pause_remaining = seconds;
    }

    fn announce_winner(&mut self, winner: Winner) {
        self.winner = Some(winner);
    }

    fn reset_winner_display(&mut self) {
        self.winner = None;
    }
}

/// `MM:SS`, zero-padded. Minutes past 99 print in full.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Banner text for a finished game.
pub fn winner_banner(winner: Winner) -> &'static str {
    match winner {
        Winner::Home => "HOME WINS",
        Winner::Guest => "GUEST WINS",
        Winner::Draw => "DRAW",
    }
}

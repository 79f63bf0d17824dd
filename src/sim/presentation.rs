/// The outward-facing surface the session pushes display updates into.
///
/// Push-only: nothing here returns a value, and the session never reads
/// state back out of it.

use std::fmt;

use crate::domain::team::{Team, Winner};

/// Quarter indicator: a number while a game exists, `-` otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum QuarterLabel {
    #[default]
    Blank,
    Number(u32),
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuarterLabel::Blank => f.write_str("-"),
            QuarterLabel::Number(n) => write!(f, "{n}"),
        }
    }
}

pub trait Presentation {
    /// Zero scores, fouls and clock; blank the quarter label.
    fn reset_display(&mut self);
    fn clear_error(&mut self);
    fn show_error(&mut self, message: &str);
    fn set_quarter_label(&mut self, quarter: QuarterLabel);
    /// Seconds remaining in the quarter; rendered as `MM:SS`.
    fn set_clock(&mut self, seconds: u32);
    fn set_score(&mut self, team: Team, value: u32);
    fn set_fouls(&mut self, team: Team, value: u32);
    fn show_pause_indicator(&mut self);
    fn hide_pause_indicator(&mut self);
    fn set_pause_remaining(&mut self, seconds: u32);
    fn announce_winner(&mut self, winner: Winner);
    fn reset_winner_display(&mut self);
}

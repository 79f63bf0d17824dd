/// Teams and match outcomes.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Team {
    Home,
    Guest,
}

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Home => "home",
            Team::Guest => "guest",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a finished game.
///
/// `as_str()` yields `"home"`, `"guest"` or `""` for a draw.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Winner {
    Home,
    Guest,
    Draw,
}

impl Winner {
    /// Decide the winner from final scores. Equal scores are a draw.
    pub fn from_scores(home: u32, guest: u32) -> Self {
        if home > guest {
            Winner::Home
        } else if guest > home {
            Winner::Guest
        } else {
            Winner::Draw
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Winner::Home => "home",
            Winner::Guest => "guest",
            Winner::Draw => "",
        }
    }
}

/// Error types for configuration and scoring.
///
/// `Display` strings double as the user-facing text handed to the
/// presentation layer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be a whole number (got \"{value}\")")]
    NotANumber { field: &'static str, value: String },

    #[error("Quarter count must be at least 1")]
    NoQuarters,

    #[error("Quarter length must be at least 1 second")]
    ZeroQuarterDuration,
}

/// Why a score increment was refused. State is unchanged in every case.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRejected {
    #[error("Game is paused")]
    Paused,

    #[error("Game is over")]
    GameOver,

    #[error("No game in progress")]
    NoGame,

    #[error("Points must be positive")]
    ZeroPoints,
}

/// Top-level failure of the terminal application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Log(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages_are_user_facing() {
        assert_eq!(ScoreRejected::Paused.to_string(), "Game is paused");
        assert_eq!(ScoreRejected::GameOver.to_string(), "Game is over");
    }

    #[test]
    fn not_a_number_names_the_field() {
        let e = ConfigError::NotANumber { field: "Quarters", value: "four".into() };
        assert_eq!(e.to_string(), "Quarters must be a whole number (got \"four\")");
    }
}

/// Game configuration: quarter count, quarter length, pause length.
///
/// Immutable once built. Construction validates: a game needs at least one
/// quarter and a quarter needs at least one second. A zero-length pause is
/// allowed and means quarters follow each other directly.

use super::error::ConfigError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfiguration {
    quarter_count: u32,
    quarter_duration_secs: u32,
    pause_duration_secs: u32,
}

impl GameConfiguration {
    pub fn new(
        quarter_count: u32,
        quarter_duration_secs: u32,
        pause_duration_secs: u32,
    ) -> Result<Self, ConfigError> {
        if quarter_count == 0 {
            return Err(ConfigError::NoQuarters);
        }
        if quarter_duration_secs == 0 {
            return Err(ConfigError::ZeroQuarterDuration);
        }
        Ok(GameConfiguration {
            quarter_count,
            quarter_duration_secs,
            pause_duration_secs,
        })
    }

    /// Build from the three raw text fields an operator typed in.
    pub fn parse_fields(quarters: &str, duration: &str, pause: &str) -> Result<Self, ConfigError> {
        let q = parse_field("Quarters", quarters)?;
        let d = parse_field("Quarter length", duration)?;
        let p = parse_field("Timeout length", pause)?;
        Self::new(q, d, p)
    }

    pub fn quarter_count(&self) -> u32 { self.quarter_count }
    pub fn quarter_duration_secs(&self) -> u32 { self.quarter_duration_secs }
    pub fn pause_duration_secs(&self) -> u32 { self.pause_duration_secs }
}

impl Default for GameConfiguration {
    fn default() -> Self {
        GameConfiguration {
            quarter_count: 4,
            quarter_duration_secs: 600,
            pause_duration_secs: 120,
        }
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse::<u32>().map_err(|_| ConfigError::NotANumber {
        field,
        value: raw.to_string(),
    })
}

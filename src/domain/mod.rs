pub mod error;
pub mod game_config;
pub mod team;

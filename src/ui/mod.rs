pub mod board;
pub mod input;
pub mod renderer;
pub mod sound;

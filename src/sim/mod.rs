pub mod event;
pub mod presentation;
pub mod schedule;
pub mod session;
pub mod state;

pub mod calendar;
pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod notify;
pub mod seed;
pub mod tracker;

pub use error::{AppError, InvalidTransition, Result};
pub use tracker::AttendanceTracker;

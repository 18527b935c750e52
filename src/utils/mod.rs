//! Utility helpers
//!
//! Small shared helpers that do not belong to any one component.

pub mod time;

pub use time::current_unix_time;

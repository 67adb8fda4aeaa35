//! Utilities shared by the Huddle packages: logging setup and wall-clock time.

pub mod logger;
pub mod time;

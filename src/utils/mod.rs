//! Crate-wide helpers: logging and test fixtures.

pub mod log;
pub mod test_utils;

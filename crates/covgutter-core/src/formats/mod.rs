//! Readers for coverage tool output.

pub mod gcov;
pub mod lcov;

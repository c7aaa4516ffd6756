//! Domain models
//!
//! This module contains all domain models used throughout the harness.

pub mod problem;
pub mod test_case;
pub mod verdict;

pub use problem::*;
pub use test_case::*;
pub use verdict::*;

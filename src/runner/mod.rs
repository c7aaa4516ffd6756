//! Solution execution engine
//!
//! A solution is any self-contained program that reads its input from stdin
//! and writes its answer to stdout. The [`Runner`] launches it through the
//! matching [`Language`] and reports what happened as an
//! [`ExecutionResult`].

pub mod executor;
pub mod languages;

pub use executor::{ExecutionResult, InputSource, Runner};
pub use languages::Language;

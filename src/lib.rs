//! cph - Competitive Programming Harness
//!
//! This library scaffolds, runs, tests and submits solutions to puzzle
//! platforms (Kattis and Project Euler).
//!
//! # Architecture
//!
//! - **CLI**: argument parsing and dispatch (thin layer)
//! - **Platforms**: per-ecosystem scaffolding, case sources and submission
//! - **Services**: case tables, verdict reporting, the judge client
//! - **Runner**: solution subprocesses with timeouts and output capture
//! - **Models**: problems, test cases and verdicts

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod platform;
pub mod runner;
pub mod services;
pub mod state;
pub mod utils;

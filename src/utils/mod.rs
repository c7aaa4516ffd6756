//! Utility functions

pub mod clipboard;
pub mod text;
pub mod time;

pub use text::{strip_trailing_newlines, truncate_chars};
pub use time::format_elapsed;

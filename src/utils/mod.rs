//! Utility functions for string and time formatting.

pub mod format;
pub mod links;

// Re-export commonly used functions at module level
pub use format::{cmp_ignore_case, format_duration, thousands};

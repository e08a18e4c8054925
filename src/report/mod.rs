//! Reporting utilities: text and JSON renderings of pipeline results.

pub mod format;

pub use format::*;

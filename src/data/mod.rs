//! Input data sources beyond user submissions.

pub mod sample;

pub use sample::*;

//! Mathematical utilities: transit geometry.

pub mod kepler;

pub use kepler::*;

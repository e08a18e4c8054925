//! Pretrained classifier support.
//!
//! The pipeline only sees the `Classifier` trait. Concrete models come from a
//! JSON artifact that is loaded once at startup and never mutated.

pub mod artifact;
pub mod classifier;
pub mod forest;
pub mod softmax;

pub use artifact::*;
pub use classifier::*;
pub use forest::*;
pub use softmax::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw measurement record (`RawObservation`) and its field order
//! - derived quantities and the ordered classifier input (`DerivedFeatures`, `FeatureVector`)
//! - classifier output and its user-facing rendering (`Label`, `Verdict`, `Locale`)

pub mod types;

pub use types::*;

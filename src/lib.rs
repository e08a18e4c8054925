//! `transit-verdict` library crate.
//!
//! The binary (`exo`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - other hosts (a web front-end, notebooks, etc.) can call `classify` directly
//! - the model is loaded once and injected, never held in a global

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use app::pipeline::{Pipeline, derive_features};
pub use domain::{RawObservation, Verdict};
pub use error::PipelineError;

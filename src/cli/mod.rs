//! Command-line parsing for the transit classifier.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline code. Measurements are accepted as text and handed to the same
//! parser the form boundary uses, so both report bad input identically.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Locale;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "exo", version, about = "Transit-based exoplanet classifier")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify a single observation and print the verdict.
    Classify(ClassifyArgs),
    /// Print the derived semi-major axis and impact parameter (no model needed).
    Derive(DeriveArgs),
    /// Classify every row of a CSV file.
    Batch(BatchArgs),
    /// Classify a seeded batch of synthetic Sun-like observations.
    Sample(SampleArgs),
    /// Describe a model artifact.
    Inspect(InspectArgs),
}

/// The eight transit measurements, taken as raw text.
#[derive(Debug, Args, Clone, Default)]
pub struct MeasurementArgs {
    /// Orbital period (days).
    #[arg(long, allow_hyphen_values = true)]
    pub period: Option<String>,

    /// Transit duration.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: Option<String>,

    /// Transit depth.
    #[arg(long, allow_hyphen_values = true)]
    pub depth: Option<String>,

    /// Planet radius.
    #[arg(long, allow_hyphen_values = true)]
    pub planet_radius: Option<String>,

    /// Stellar effective temperature (K).
    #[arg(long, allow_hyphen_values = true)]
    pub stellar_teff: Option<String>,

    /// Stellar radius (solar radii).
    #[arg(long, allow_hyphen_values = true)]
    pub stellar_radius: Option<String>,

    /// Stellar mass (solar masses).
    #[arg(long, allow_hyphen_values = true)]
    pub stellar_mass: Option<String>,

    /// Insolation flux (Earth = 1).
    #[arg(long, allow_hyphen_values = true)]
    pub insolation: Option<String>,
}

impl MeasurementArgs {
    /// Supplied values keyed by field name; omitted flags are left out so the
    /// parser reports them as missing.
    pub fn to_fields(&self) -> HashMap<String, String> {
        [
            ("period", &self.period),
            ("duration", &self.duration),
            ("depth", &self.depth),
            ("planet_radius", &self.planet_radius),
            ("stellar_teff", &self.stellar_teff),
            ("stellar_radius", &self.stellar_radius),
            ("stellar_mass", &self.stellar_mass),
            ("insolation", &self.insolation),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}

/// Model selection and domain handling shared by scoring commands.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Model artifact (JSON). Defaults to $EXO_MODEL, then `model.json`.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Let NaN from physically inconsistent inputs reach the classifier
    /// instead of failing.
    #[arg(long)]
    pub permissive: bool,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub measurements: MeasurementArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Verdict language.
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub lang: Locale,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub measurements: MeasurementArgs,

    /// Skip the positivity and real-valued checks.
    #[arg(long)]
    pub permissive: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV with a header containing the eight measurement columns (optional `id`).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Export per-row results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Verdict language.
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub lang: Locale,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of synthetic observations.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: usize,

    /// Random seed (same seed, same sample).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export per-row results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Verdict language.
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub lang: Locale,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Model artifact (JSON). Defaults to $EXO_MODEL, then `model.json`.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

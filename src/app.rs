//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments and environment settings
//! - loads the model artifact once
//! - runs the classification pipeline
//! - prints reports and writes optional exports

use std::path::Path;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, ClassifyArgs, Command, DeriveArgs, InspectArgs, ModelArgs, SampleArgs};
use crate::config::Settings;
use crate::domain::{Locale, RawObservation, SampleConfig, ScoredRow};
use crate::error::AppError;
use crate::io::ingest::{RowError, parse_fields};
use crate::models::{ModelArtifact, load_model};

pub mod pipeline;

use pipeline::Pipeline;

/// Entry point for the `exo` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let cli = crate::cli::Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Classify(args) => handle_classify(args, &settings),
        Command::Derive(args) => handle_derive(args, &settings),
        Command::Batch(args) => handle_batch(args, &settings),
        Command::Sample(args) => handle_sample(args, &settings),
        Command::Inspect(args) => handle_inspect(args, &settings),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "transit_verdict=warn".into());
    // A second init (e.g. in tests) is harmless, so the error is ignored.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the model once and wrap it in a pipeline.
///
/// A model that fails to load is fatal: no observation is scored without one.
fn load_pipeline(args: &ModelArgs, settings: &Settings) -> Result<Pipeline<ModelArtifact>, AppError> {
    let path = settings.model_path(args.model.as_deref());
    let artifact = load_model(path)?;
    Ok(Pipeline::new(artifact).with_policy(settings.policy(args.permissive)))
}

fn handle_classify(args: ClassifyArgs, settings: &Settings) -> Result<(), AppError> {
    let pipeline = load_pipeline(&args.model, settings)?;
    let raw = parse_fields(&args.measurements.to_fields(), pipeline.policy())?;
    let assessment = pipeline.assess(&raw)?;

    if args.json {
        println!("{}", crate::report::assessment_json(&assessment, args.lang));
    } else {
        print!("{}", crate::report::format_assessment(&assessment, args.lang));
    }
    Ok(())
}

fn handle_derive(args: DeriveArgs, settings: &Settings) -> Result<(), AppError> {
    let policy = settings.policy(args.permissive);
    let raw = parse_fields(&args.measurements.to_fields(), policy)?;
    let derived = pipeline::derive_features(&raw, policy)?;

    if args.json {
        let features = crate::domain::FeatureVector::assemble(&raw, &derived);
        println!("{}", crate::report::features_json(&features));
    } else {
        print!("{}", crate::report::format_derived(&raw, &derived));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, settings: &Settings) -> Result<(), AppError> {
    let pipeline = load_pipeline(&args.model, settings)?;
    let batch = crate::io::ingest::load_observations_csv(&args.csv, pipeline.policy())?;

    let ids: Vec<String> = batch.rows.iter().map(|r| r.id.clone()).collect();
    let observations: Vec<RawObservation> = batch.rows.iter().map(|r| r.observation).collect();
    let rows = score_rows(&pipeline, ids, &observations);

    tracing::info!(
        rows_read = batch.rows_read,
        scored = rows.len(),
        skipped = batch.row_errors.len(),
        "batch classified"
    );
    finish_batch(&rows, &batch.row_errors, args.export.as_deref(), args.lang)
}

fn handle_sample(args: SampleArgs, settings: &Settings) -> Result<(), AppError> {
    let pipeline = load_pipeline(&args.model, settings)?;
    let observations = crate::data::generate_sample(&SampleConfig {
        count: args.count,
        seed: args.seed,
    })?;

    let ids = (1..=observations.len()).map(|i| format!("syn-{i:04}")).collect();
    let rows = score_rows(&pipeline, ids, &observations);
    finish_batch(&rows, &[], args.export.as_deref(), args.lang)
}

fn handle_inspect(args: InspectArgs, settings: &Settings) -> Result<(), AppError> {
    let path = settings.model_path(args.model.as_deref());
    let artifact = load_model(path)?;
    print!("{}", crate::report::format_model_summary(path, &artifact.summary()));
    Ok(())
}

fn score_rows(pipeline: &Pipeline<ModelArtifact>, ids: Vec<String>, observations: &[RawObservation]) -> Vec<ScoredRow> {
    let outcomes = pipeline.classify_batch(observations);
    ids.into_iter()
        .zip(observations)
        .zip(outcomes)
        .map(|((id, &observation), outcome)| ScoredRow {
            id,
            observation,
            outcome,
        })
        .collect()
}

fn finish_batch(rows: &[ScoredRow], row_errors: &[RowError], export: Option<&Path>, locale: Locale) -> Result<(), AppError> {
    print!("{}", crate::report::format_batch(rows, row_errors, locale));

    if let Some(path) = export {
        crate::io::export::write_results_csv(path, rows, Utc::now(), locale)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

//! Input parsing: form fields and CSV batches.
//!
//! This module turns user-supplied text into `RawObservation`s.
//!
//! Design goals:
//! - **Fail fast** for a single submission: the first bad field (in declared
//!   order) is reported by name
//! - **Row-level validation** for batches: skip bad rows, but report what happened
//! - **Strict schema**: a CSV missing one of the eight measurement columns is
//!   rejected as a whole
//! - **Separation of concerns**: no feature derivation or scoring here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DomainPolicy, FIELD_COUNT, FIELD_NAMES, RawObservation, check_value};
use crate::error::{AppError, PipelineError};

/// Parse one textual measurement.
///
/// `None` and blank text both count as missing.
pub fn parse_field(field: &'static str, text: Option<&str>, policy: DomainPolicy) -> Result<f64, PipelineError> {
    let text = text
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::invalid_input(field, "missing value"))?;
    let value = text
        .parse::<f64>()
        .map_err(|_| PipelineError::invalid_input(field, format!("'{text}' is not a number")))?;
    check_value(field, value, policy)
}

/// Parse the eight named form values into an observation.
///
/// Extra keys are ignored.
pub fn parse_fields(fields: &HashMap<String, String>, policy: DomainPolicy) -> Result<RawObservation, PipelineError> {
    let mut values = [0.0; FIELD_COUNT];
    for (slot, name) in values.iter_mut().zip(FIELD_NAMES) {
        *slot = parse_field(name, fields.get(name).map(String::as_str), policy)?;
    }
    Ok(RawObservation::from_array(values))
}

/// One successfully parsed CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub id: String,
    pub line: usize,
    pub observation: RawObservation,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: parsed rows + row errors.
#[derive(Debug, Clone, Default)]
pub struct ObservationBatch {
    pub rows: Vec<ObservationRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load observations from a CSV file with a header row.
pub fn load_observations_csv(path: &Path, policy: DomainPolicy) -> Result<ObservationBatch, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations(file, policy)
}

/// Read observations from any CSV source.
pub fn read_observations<R: std::io::Read>(source: R, policy: DomainPolicy) -> Result<ObservationBatch, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<&str> = FIELD_NAMES
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            2,
            format!("CSV is missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut batch = ObservationBatch::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        batch.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                batch.row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = header_map
            .get("id")
            .and_then(|&i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match parse_record(&record, &header_map, policy) {
            Ok(observation) => batch.rows.push(ObservationRow {
                id: id.unwrap_or_else(|| format!("row-{line}")),
                line,
                observation,
            }),
            Err(e) => {
                tracing::warn!(line, id = id.as_deref().unwrap_or(""), error = %e, "skipping CSV row");
                batch.row_errors.push(RowError {
                    line,
                    id,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}

fn parse_record(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    policy: DomainPolicy,
) -> Result<RawObservation, PipelineError> {
    let mut values = [0.0; FIELD_COUNT];
    for (slot, name) in values.iter_mut().zip(FIELD_NAMES) {
        let text = header_map.get(name).and_then(|&i| record.get(i));
        *slot = parse_field(name, text, policy)?;
    }
    Ok(RawObservation::from_array(values))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

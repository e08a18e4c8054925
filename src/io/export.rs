//! Export batch results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! The `verdict` column is written in the requested locale. Rows that failed
//! carry the error text in `verdict` and leave the derived columns empty.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::{Locale, ScoredRow};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    id: &'a str,
    period: f64,
    duration: f64,
    depth: f64,
    planet_radius: f64,
    stellar_teff: f64,
    stellar_radius: f64,
    stellar_mass: f64,
    insolation: f64,
    a: Option<f64>,
    b: Option<f64>,
    label: Option<i64>,
    verdict: String,
    classified_at: &'a str,
}

/// Write per-observation results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    rows: &[ScoredRow],
    classified_at: DateTime<Utc>,
    locale: Locale,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, rows, classified_at, locale)
}

/// Write per-observation results to any writer.
pub fn write_results<W: std::io::Write>(
    sink: W,
    rows: &[ScoredRow],
    classified_at: DateTime<Utc>,
    locale: Locale,
) -> Result<(), AppError> {
    let stamp = classified_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut writer = csv::Writer::from_writer(sink);

    for row in rows {
        let o = &row.observation;
        let (a, b, label, verdict) = match &row.outcome {
            Ok(assessment) => (
                Some(assessment.derived.a),
                Some(assessment.derived.b),
                Some(assessment.label.0),
                assessment.verdict.text(locale).to_string(),
            ),
            Err(e) => (None, None, None, format!("error: {e}")),
        };
        writer
            .serialize(ExportRecord {
                id: &row.id,
                period: o.period,
                duration: o.duration,
                depth: o.depth,
                planet_radius: o.planet_radius,
                stellar_teff: o.stellar_teff,
                stellar_radius: o.stellar_radius,
                stellar_mass: o.stellar_mass,
                insolation: o.insolation,
                a,
                b,
                label,
                verdict,
                classified_at: &stamp,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::{Assessment, DerivedFeatures, FeatureVector, Label, RawObservation, Verdict};
    use crate::error::PipelineError;

    #[test]
    fn writes_header_success_and_error_rows() {
        let observation = RawObservation::from_array([10.0, 3.0, 500.0, 2.0, 5500.0, 1.0, 1.0, 50.0]);
        let derived = DerivedFeatures { a: 0.09, b: 1.5 };
        let ok = ScoredRow {
            id: "k1".into(),
            observation,
            outcome: Ok(Assessment {
                observation,
                derived,
                features: FeatureVector::assemble(&observation, &derived),
                label: Label(1),
                verdict: Verdict::Candidate,
            }),
        };
        let failed = ScoredRow {
            id: "k2".into(),
            observation,
            outcome: Err(PipelineError::domain("b", "radicand is negative")),
        };

        let at = Utc.with_ymd_and_hms(2025, 10, 5, 12, 0, 0).unwrap();
        let mut out = Vec::new();
        write_results(&mut out, &[ok.clone(), failed], at, Locale::En).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,period,duration,depth,planet_radius,stellar_teff,stellar_radius,stellar_mass,insolation,a,b,label,verdict,classified_at"
        );
        assert!(lines[1].starts_with("k1,10.0,3.0,"), "{}", lines[1]);
        assert!(lines[1].ends_with(",0.09,1.5,1,exoplanet candidate,2025-10-05T12:00:00Z"), "{}", lines[1]);
        assert!(lines[2].contains(",,,,error: inputs are physically inconsistent"), "{}", lines[2]);

        let mut out = Vec::new();
        write_results(&mut out, &[ok], at, Locale::Es).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",1,Candidato a exoplaneta,"), "{text}");
    }

    #[test]
    fn write_results_csv_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_results_csv(&path, &[], Utc::now(), Locale::En).unwrap();
        assert!(path.exists());
    }
}

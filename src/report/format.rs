//! Formatted terminal output.
//!
//! We keep formatting code in one place so the pipeline stays free of
//! presentation concerns.

use serde_json::{Map, Value, json};

use crate::domain::{Assessment, DerivedFeatures, FeatureVector, Locale, RawObservation, ScoredRow, Verdict};
use crate::io::ingest::RowError;
use crate::models::{ModelFamily, ModelSummary};

/// Verdict counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub confirmed: usize,
    pub candidates: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchTally {
    pub fn from_rows(rows: &[ScoredRow]) -> Self {
        let mut tally = Self::default();
        for row in rows {
            match &row.outcome {
                Ok(a) => match a.verdict {
                    Verdict::Confirmed => tally.confirmed += 1,
                    Verdict::Candidate => tally.candidates += 1,
                    Verdict::NotExoplanet => tally.rejected += 1,
                },
                Err(_) => tally.failed += 1,
            }
        }
        tally
    }
}

/// Single-observation report.
pub fn format_assessment(assessment: &Assessment, locale: Locale) -> String {
    let mut out = String::new();
    out.push_str("=== exo - transit classification ===\n");
    out.push_str(&format_features(&assessment.features));
    out.push_str(&format!("Label: {}\n", assessment.label.0));
    out.push_str(&format!("Verdict: {}\n", assessment.verdict.text(locale)));
    out
}

/// Derived geometry only.
pub fn format_derived(raw: &RawObservation, derived: &DerivedFeatures) -> String {
    format_features(&FeatureVector::assemble(raw, derived))
}

fn format_features(features: &FeatureVector) -> String {
    let mut out = String::new();
    for (i, (name, value)) in features.named().enumerate() {
        if i == FeatureVector::A_INDEX {
            out.push_str("-- derived --\n");
        }
        out.push_str(&format!("{name:>15}: {}\n", fmt_value(value)));
    }
    out
}

/// JSON object of the ten features keyed by name.
pub fn features_json(features: &FeatureVector) -> Value {
    let map: Map<String, Value> = features
        .named()
        .map(|(name, value)| (name.to_string(), json_number(value)))
        .collect();
    Value::Object(map)
}

pub fn assessment_json(assessment: &Assessment, locale: Locale) -> Value {
    json!({
        "features": features_json(&assessment.features),
        "label": assessment.label.0,
        "verdict": assessment.verdict,
        "message": assessment.verdict.text(locale),
    })
}

/// One line per row plus a tally.
pub fn format_batch(rows: &[ScoredRow], row_errors: &[RowError], locale: Locale) -> String {
    let mut out = String::new();
    let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);

    out.push_str(&format!(
        "{:<id_width$}  {:>10}  {:>10}  {:>10}  {}\n",
        "id", "period", "a", "b", "verdict"
    ));
    for row in rows {
        match &row.outcome {
            Ok(a) => out.push_str(&format!(
                "{:<id_width$}  {:>10}  {:>10}  {:>10}  {}\n",
                row.id,
                fmt_value(row.observation.period),
                fmt_value(a.derived.a),
                fmt_value(a.derived.b),
                a.verdict.text(locale)
            )),
            Err(e) => out.push_str(&format!(
                "{:<id_width$}  {:>10}  {:>10}  {:>10}  error: {e}\n",
                row.id,
                fmt_value(row.observation.period),
                "-",
                "-"
            )),
        }
    }

    if !row_errors.is_empty() {
        out.push_str(&format!("\nSkipped {} unreadable row(s):\n", row_errors.len()));
        for e in row_errors {
            let id = e.id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default();
            out.push_str(&format!("  line {}{id}: {}\n", e.line, e.message));
        }
    }

    let tally = BatchTally::from_rows(rows);
    out.push_str(&format!(
        "\nconfirmed: {}  candidates: {}  not exoplanets: {}  failed: {}\n",
        tally.confirmed,
        tally.candidates,
        tally.rejected,
        tally.failed + row_errors.len()
    ));
    out
}

pub fn format_model_summary(path: &std::path::Path, summary: &ModelSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model: {}\n", path.display()));
    out.push_str(&format!("Kind: {}\n", summary.kind));
    match summary.kind {
        ModelFamily::Forest => {
            out.push_str(&format!("Trees: {}\n", summary.components));
            out.push_str(&format!("Max depth: {}\n", summary.max_depth));
        }
        ModelFamily::Softmax => out.push_str(&format!("Classes: {}\n", summary.components)),
    }
    out.push_str(&format!("Features: {}\n", summary.feature_names.join(", ")));
    out
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-3) {
        format!("{v:.4e}")
    } else {
        format!("{v:.6}")
    }
}

// JSON has no NaN; emit null instead.
fn json_number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

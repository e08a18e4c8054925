//! Shared domain types.
//!
//! Most of these types are small and `Copy` so they can be:
//!
//! - built fresh for every request and thrown away afterwards
//! - scored in parallel without any shared mutable state
//! - rendered to JSON for scripting

use std::fmt;

use clap::ValueEnum;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Number of raw measurements a caller must supply.
pub const FIELD_COUNT: usize = 8;

/// Number of features the classifier was trained on (raw fields + `a` + `b`).
pub const FEATURE_LEN: usize = FIELD_COUNT + 2;

/// Raw measurement names, in the order the classifier expects them.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "period",
    "duration",
    "depth",
    "planet_radius",
    "stellar_teff",
    "stellar_radius",
    "stellar_mass",
    "insolation",
];

/// Full feature names: the raw fields followed by the derived `a` and `b`.
pub const FEATURE_NAMES: [&str; FEATURE_LEN] = [
    "period",
    "duration",
    "depth",
    "planet_radius",
    "stellar_teff",
    "stellar_radius",
    "stellar_mass",
    "insolation",
    "a",
    "b",
];

/// Fields that must be strictly positive under [`DomainPolicy::Strict`].
pub const POSITIVE_FIELDS: [&str; 4] = ["period", "duration", "stellar_radius", "stellar_mass"];

/// How the pipeline treats inputs for which the derived quantities are undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DomainPolicy {
    /// Reject non-positive period/duration/stellar radius/stellar mass and
    /// fail with a domain error when `a` or `b` is not a finite real number.
    #[default]
    Strict,
    /// Skip the guards and let NaN flow into the classifier.
    Permissive,
}

/// Language used when rendering a verdict to an end user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

/// One transit observation as submitted by a user.
///
/// Field order matches [`FIELD_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Orbital period (days).
    pub period: f64,
    /// Transit duration.
    pub duration: f64,
    /// Transit depth.
    pub depth: f64,
    /// Planet radius.
    pub planet_radius: f64,
    /// Stellar effective temperature (K).
    pub stellar_teff: f64,
    /// Stellar radius (solar radii).
    pub stellar_radius: f64,
    /// Stellar mass (solar masses).
    pub stellar_mass: f64,
    /// Insolation flux relative to Earth.
    pub insolation: f64,
}

impl RawObservation {
    /// Build an observation from values in [`FIELD_NAMES`] order.
    pub fn from_array(values: [f64; FIELD_COUNT]) -> Self {
        let [
            period,
            duration,
            depth,
            planet_radius,
            stellar_teff,
            stellar_radius,
            stellar_mass,
            insolation,
        ] = values;
        Self {
            period,
            duration,
            depth,
            planet_radius,
            stellar_teff,
            stellar_radius,
            stellar_mass,
            insolation,
        }
    }

    /// Values in [`FIELD_NAMES`] order.
    pub fn to_array(&self) -> [f64; FIELD_COUNT] {
        [
            self.period,
            self.duration,
            self.depth,
            self.planet_radius,
            self.stellar_teff,
            self.stellar_radius,
            self.stellar_mass,
            self.insolation,
        ]
    }

    /// Check every field in declared order, failing on the first bad one.
    pub fn validate(&self, policy: DomainPolicy) -> Result<(), PipelineError> {
        for (name, value) in FIELD_NAMES.into_iter().zip(self.to_array()) {
            check_value(name, value, policy)?;
        }
        Ok(())
    }
}

/// Validate a single parsed measurement.
///
/// Non-finite values are rejected under every policy; positivity is only
/// enforced for [`POSITIVE_FIELDS`] under [`DomainPolicy::Strict`].
///
/// A negative `stellar_mass` is let through here: it leaves `a` without a real
/// cube root, which `derive_features` reports as a domain error. Zero mass is
/// still an input error.
pub fn check_value(field: &'static str, value: f64, policy: DomainPolicy) -> Result<f64, PipelineError> {
    if !value.is_finite() {
        return Err(PipelineError::invalid_input(field, format!("expected a finite number, got {value}")));
    }
    let negative_mass = field == "stellar_mass" && value < 0.0;
    if policy == DomainPolicy::Strict && POSITIVE_FIELDS.contains(&field) && value <= 0.0 && !negative_mass {
        return Err(PipelineError::invalid_input(field, format!("must be greater than zero, got {value}")));
    }
    Ok(value)
}

/// Quantities derived from a [`RawObservation`]; never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Semi-major axis (AU in solar-mass/day units).
    pub a: f64,
    /// Transit impact parameter proxy.
    pub b: f64,
}

/// The ordered 10-element classifier input.
///
/// Indices 0..8 hold the raw fields in [`FIELD_NAMES`] order, index 8 holds `a`
/// and index 9 holds `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(SVector<f64, FEATURE_LEN>);

impl FeatureVector {
    pub const A_INDEX: usize = FIELD_COUNT;
    pub const B_INDEX: usize = FIELD_COUNT + 1;

    pub fn assemble(raw: &RawObservation, derived: &DerivedFeatures) -> Self {
        let mut v = SVector::<f64, FEATURE_LEN>::zeros();
        for (i, value) in raw.to_array().into_iter().enumerate() {
            v[i] = value;
        }
        v[Self::A_INDEX] = derived.a;
        v[Self::B_INDEX] = derived.b;
        Self(v)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    pub fn as_vector(&self) -> &SVector<f64, FEATURE_LEN> {
        &self.0
    }

    /// `(name, value)` pairs in classifier order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// Raw classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub i64);

/// Final three-way classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Confirmed,
    Candidate,
    NotExoplanet,
}

impl Verdict {
    /// Label 2 is a confirmed planet, 1 a candidate, anything else a false positive.
    pub fn from_label(label: Label) -> Self {
        match label.0 {
            2 => Verdict::Confirmed,
            1 => Verdict::Candidate,
            _ => Verdict::NotExoplanet,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.text(Locale::En)
    }

    pub fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Verdict::Confirmed, Locale::En) => "confirmed exoplanet",
            (Verdict::Candidate, Locale::En) => "exoplanet candidate",
            (Verdict::NotExoplanet, Locale::En) => "not an exoplanet",
            (Verdict::Confirmed, Locale::Es) => "Exoplaneta confirmado",
            (Verdict::Candidate, Locale::Es) => "Candidato a exoplaneta",
            (Verdict::NotExoplanet, Locale::Es) => "No es un exoplaneta",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything computed for one observation in a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub observation: RawObservation,
    pub derived: DerivedFeatures,
    pub features: FeatureVector,
    pub label: Label,
    pub verdict: Verdict,
}

/// Outcome of scoring one identified observation in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub id: String,
    pub observation: RawObservation,
    pub outcome: Result<Assessment, PipelineError>,
}

/// Settings for the synthetic observation generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth_like() -> RawObservation {
        RawObservation::from_array([365.25, 13.0, 84.0, 1.0, 5778.0, 1.0, 1.0, 1.0])
    }

    #[test]
    fn array_round_trip_keeps_declared_order() {
        let raw = earth_like();
        assert_eq!(raw.period, 365.25);
        assert_eq!(raw.stellar_teff, 5778.0);
        assert_eq!(raw.to_array()[7], raw.insolation);
    }

    #[test]
    fn feature_vector_places_derived_values_last() {
        let raw = earth_like();
        let derived = DerivedFeatures { a: 0.5, b: 0.25 };
        let fv = FeatureVector::assemble(&raw, &derived);

        assert_eq!(fv.as_slice().len(), FEATURE_LEN);
        assert_eq!(&fv.as_slice()[..FIELD_COUNT], &raw.to_array()[..]);
        assert_eq!(fv.as_slice()[8], 0.5);
        assert_eq!(fv.as_slice()[9], 0.25);

        let names: Vec<&str> = fv.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_NAMES);
    }

    #[test]
    fn label_mapping_is_exhaustive() {
        assert_eq!(Verdict::from_label(Label(2)), Verdict::Confirmed);
        assert_eq!(Verdict::from_label(Label(1)), Verdict::Candidate);
        for other in [0, -1, 3, 7, i64::MIN, i64::MAX] {
            assert_eq!(Verdict::from_label(Label(other)), Verdict::NotExoplanet);
        }
        assert_eq!(Verdict::Confirmed.to_string(), "confirmed exoplanet");
        assert_eq!(Verdict::Candidate.to_string(), "exoplanet candidate");
        assert_eq!(Verdict::NotExoplanet.to_string(), "not an exoplanet");
        assert_eq!(Verdict::Candidate.text(Locale::Es), "Candidato a exoplaneta");
    }

    #[test]
    fn strict_validation_rejects_non_positive_fields() {
        let mut raw = earth_like();
        raw.stellar_mass = 0.0;
        let err = raw.validate(DomainPolicy::Strict).unwrap_err();
        assert_eq!(err.field(), Some("stellar_mass"));

        // Negative mass is left for the derivation step.
        let mut raw = earth_like();
        raw.stellar_mass = -1.0;
        assert!(raw.validate(DomainPolicy::Strict).is_ok());

        let mut raw = earth_like();
        raw.period = -1.0;
        assert_eq!(raw.validate(DomainPolicy::Strict).unwrap_err().field(), Some("period"));

        // Depth is not a positivity-checked field.
        let mut raw = earth_like();
        raw.depth = -1.0;
        assert!(raw.validate(DomainPolicy::Strict).is_ok());
    }

    #[test]
    fn permissive_validation_still_rejects_non_finite() {
        let mut raw = earth_like();
        raw.period = -5.0;
        assert!(raw.validate(DomainPolicy::Permissive).is_ok());

        raw.insolation = f64::NAN;
        let err = raw.validate(DomainPolicy::Permissive).unwrap_err();
        assert_eq!(err.field(), Some("insolation"));
    }
}

//! Shared classification pipeline used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! parse -> validate -> derive `a`/`b` -> assemble features -> score -> verdict
//!
//! The CLI commands (single, batch, synthetic) then focus on presentation.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::{
    Assessment, DerivedFeatures, DomainPolicy, FeatureVector, RawObservation, Verdict,
};
use crate::error::PipelineError;
use crate::io::ingest::parse_fields;
use crate::math::{impact_radicand, semi_major_axis};
use crate::models::Classifier;

/// Compute `a` and `b` for an observation under the given policy.
///
/// Under `Strict` the observation is validated first and any non-finite
/// derived value is a domain error. Under `Permissive` NaN is returned as-is.
pub fn derive_features(raw: &RawObservation, policy: DomainPolicy) -> Result<DerivedFeatures, PipelineError> {
    raw.validate(policy)?;

    if policy == DomainPolicy::Strict && raw.stellar_mass < 0.0 {
        return Err(PipelineError::domain(
            "a",
            format!("has no real cube root: stellar_mass is negative ({})", raw.stellar_mass),
        ));
    }

    let a = semi_major_axis(raw.stellar_mass, raw.period);
    let radicand = impact_radicand(raw.planet_radius, raw.stellar_radius, a, raw.duration, raw.period);
    let b = radicand.sqrt();

    if policy == DomainPolicy::Strict {
        if !a.is_finite() {
            return Err(PipelineError::domain("a", format!("is not a finite real number ({a})")));
        }
        if radicand < 0.0 {
            return Err(PipelineError::domain(
                "b",
                format!("is imaginary: transit duration is too long for the orbit (radicand {radicand:.6})"),
            ));
        }
        if !b.is_finite() {
            return Err(PipelineError::domain("b", format!("is not a finite real number ({b})")));
        }
    }

    tracing::debug!(a, b, ?policy, "derived transit geometry");
    Ok(DerivedFeatures { a, b })
}

/// Feature pipeline plus an injected, read-only classifier.
#[derive(Debug, Clone)]
pub struct Pipeline<C> {
    classifier: C,
    policy: DomainPolicy,
}

impl<C: Classifier> Pipeline<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            policy: DomainPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DomainPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn derive(&self, raw: &RawObservation) -> Result<DerivedFeatures, PipelineError> {
        derive_features(raw, self.policy)
    }

    /// The ordered 10-element vector the classifier sees.
    pub fn features(&self, raw: &RawObservation) -> Result<FeatureVector, PipelineError> {
        let derived = self.derive(raw)?;
        Ok(FeatureVector::assemble(raw, &derived))
    }

    /// Run the full pipeline and keep every intermediate result.
    pub fn assess(&self, raw: &RawObservation) -> Result<Assessment, PipelineError> {
        let derived = self.derive(raw)?;
        let features = FeatureVector::assemble(raw, &derived);
        let label = self.classifier.predict(&features);
        let verdict = Verdict::from_label(label);

        Ok(Assessment {
            observation: *raw,
            derived,
            features,
            label,
            verdict,
        })
    }

    pub fn classify(&self, raw: &RawObservation) -> Result<Verdict, PipelineError> {
        self.assess(raw).map(|a| a.verdict)
    }

    /// Classify a name -> text mapping as submitted by a form.
    pub fn classify_fields(&self, fields: &HashMap<String, String>) -> Result<Verdict, PipelineError> {
        let raw = parse_fields(fields, self.policy)?;
        self.classify(&raw)
    }

    /// Score many observations in parallel; results keep input order.
    pub fn classify_batch(&self, observations: &[RawObservation]) -> Vec<Result<Assessment, PipelineError>> {
        observations.par_iter().map(|raw| self.assess(raw)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{FEATURE_LEN, Label};

    /// Returns a fixed label and records what it was asked to score.
    struct StubClassifier {
        label: i64,
        calls: AtomicUsize,
        last: Mutex<Option<Vec<f64>>>,
    }

    impl StubClassifier {
        fn returning(label: i64) -> Self {
            Self {
                label,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for StubClassifier {
        fn predict(&self, features: &FeatureVector) -> Label {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(features.as_slice().to_vec());
            Label(self.label)
        }
    }

    fn earth() -> RawObservation {
        RawObservation::from_array([365.25, 13.0, 84.0, 1.0, 5778.0, 1.0, 1.0, 1.0])
    }

    fn earth_fields() -> HashMap<String, String> {
        [
            ("period", "365.25"),
            ("duration", "13"),
            ("depth", "84"),
            ("planet_radius", "1"),
            ("stellar_teff", "5778"),
            ("stellar_radius", "1"),
            ("stellar_mass", "1"),
            ("insolation", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn end_to_end_with_stubbed_classifier() {
        let confirmed = Pipeline::new(StubClassifier::returning(2));
        let verdict = confirmed.classify_fields(&earth_fields()).unwrap();
        assert_eq!(verdict.to_string(), "confirmed exoplanet");
        assert_eq!(confirmed.classifier().calls(), 1);

        let rejected = Pipeline::new(StubClassifier::returning(0));
        let verdict = rejected.classify_fields(&earth_fields()).unwrap();
        assert_eq!(verdict.to_string(), "not an exoplanet");
    }

    #[test]
    fn classifier_sees_raw_fields_then_a_then_b() {
        let pipeline = Pipeline::new(StubClassifier::returning(1));
        let raw = earth();
        pipeline.classify(&raw).unwrap();

        let seen = pipeline.classifier().last.lock().unwrap().clone().unwrap();
        assert_eq!(seen.len(), FEATURE_LEN);
        assert_eq!(&seen[..8], &raw.to_array()[..]);

        let derived = pipeline.derive(&raw).unwrap();
        assert_eq!(seen[8], derived.a);
        assert_eq!(seen[9], derived.b);
        assert!((derived.a - 0.999986).abs() < 1e-5);
        // chord = pi * a * 13 / 365.25 ~= 0.1118, size = 2
        assert!((derived.b - (4.0f64 - 0.1118f64.powi(2)).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn repeated_classification_is_deterministic() {
        let pipeline = Pipeline::new(StubClassifier::returning(1));
        let raw = earth();
        let first = pipeline.assess(&raw).unwrap();
        for _ in 0..10 {
            assert_eq!(pipeline.assess(&raw).unwrap(), first);
        }
    }

    #[test]
    fn invalid_field_never_reaches_classifier() {
        let pipeline = Pipeline::new(StubClassifier::returning(2));
        for name in crate::domain::FIELD_NAMES {
            let mut fields = earth_fields();
            fields.insert(name.to_string(), "not-a-number".to_string());
            let err = pipeline.classify_fields(&fields).unwrap_err();
            assert_eq!(err.field(), Some(name));
        }
        assert_eq!(pipeline.classifier().calls(), 0);
    }

    #[test]
    fn strict_policy_rejects_imaginary_impact_parameter() {
        let pipeline = Pipeline::new(StubClassifier::returning(2));
        let mut raw = earth();
        raw.period = 1.0;
        raw.duration = 30.0;
        raw.planet_radius = 0.01;

        let err = pipeline.classify(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::Domain { quantity: "b", .. }), "{err:?}");
        assert_eq!(pipeline.classifier().calls(), 0);
    }

    #[test]
    fn permissive_policy_propagates_nan() {
        let pipeline = Pipeline::new(StubClassifier::returning(1)).with_policy(DomainPolicy::Permissive);
        let mut raw = earth();
        raw.stellar_mass = -1.0;

        let assessment = pipeline.assess(&raw).unwrap();
        assert!(assessment.derived.a.is_nan());
        assert!(assessment.features.as_slice()[9].is_nan());
        assert_eq!(assessment.verdict, Verdict::Candidate);
        assert_eq!(pipeline.classifier().calls(), 1);
    }

    #[test]
    fn strict_policy_reports_negative_mass_as_domain_error() {
        let pipeline = Pipeline::new(StubClassifier::returning(1));
        let mut raw = earth();
        raw.stellar_mass = -1.0;
        let err = pipeline.classify(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::Domain { quantity: "a", .. }), "{err:?}");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(pipeline.classifier().calls(), 0);
    }

    #[test]
    fn strict_policy_rejects_zero_mass_as_input_error() {
        let pipeline = Pipeline::new(StubClassifier::returning(1));
        let mut raw = earth();
        raw.stellar_mass = 0.0;
        let err = pipeline.classify(&raw).unwrap_err();
        assert_eq!(err.field(), Some("stellar_mass"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn batch_keeps_input_order() {
        let pipeline = Pipeline::new(StubClassifier::returning(2));
        let mut bad = earth();
        bad.duration = 0.0;
        let inputs: Vec<RawObservation> = (0..50)
            .map(|i| if i % 7 == 0 { bad } else { RawObservation { period: 100.0 + i as f64, ..earth() } })
            .collect();

        let results = pipeline.classify_batch(&inputs);
        assert_eq!(results.len(), inputs.len());
        for (i, (input, result)) in inputs.iter().zip(&results).enumerate() {
            if i % 7 == 0 {
                assert!(result.is_err());
            } else {
                assert_eq!(result.as_ref().unwrap().observation, *input);
            }
        }
    }

    #[test]
    fn bundled_demo_batch_scores_each_row() {
        use std::path::Path;

        use crate::io::ingest::load_observations_csv;
        use crate::models::load_model;

        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let pipeline = Pipeline::new(load_model(&demos.join("model.json")).unwrap());
        let batch = load_observations_csv(&demos.join("observations.csv"), pipeline.policy()).unwrap();

        assert_eq!(batch.rows_read, 4);
        let ids: Vec<&str> = batch.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["earth-analog", "hot-jupiter", "too-long"]);
        assert_eq!(batch.row_errors.len(), 1);
        assert_eq!(batch.row_errors[0].line, 4);
        assert_eq!(batch.row_errors[0].id.as_deref(), Some("bad-period"));
        assert!(batch.row_errors[0].message.contains("period"), "{}", batch.row_errors[0].message);

        let observations: Vec<RawObservation> = batch.rows.iter().map(|r| r.observation).collect();
        let results = pipeline.classify_batch(&observations);
        assert_eq!(results.len(), 3);

        let earth = results[0].as_ref().unwrap();
        assert_eq!(earth.verdict, Verdict::Confirmed);
        assert!((earth.derived.a - 0.999987).abs() < 1e-5);

        let jupiter = results[1].as_ref().unwrap();
        assert_eq!(jupiter.verdict, Verdict::Confirmed);
        assert!((jupiter.derived.b - 12.2494).abs() < 1e-3);

        let err = results[2].as_ref().unwrap_err();
        assert!(matches!(err, PipelineError::Domain { quantity: "b", .. }), "{err:?}");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn works_with_shared_classifier() {
        let shared = std::sync::Arc::new(StubClassifier::returning(1));
        let a = Pipeline::new(shared.clone());
        let b = Pipeline::new(shared.clone());
        a.classify(&earth()).unwrap();
        b.classify(&earth()).unwrap();
        assert_eq!(shared.calls(), 2);
    }
}

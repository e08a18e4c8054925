//! Persisted model artifact: load once, validate, then score read-only.
//!
//! Artifact JSON layout:
//!
//! ```text
//! {
//!   "feature_names": ["period", ..., "a", "b"],
//!   "model": { "kind": "forest", "trees": [...] }
//!          | { "kind": "softmax", "classes": [...], "weights": [[...]], "bias": [...] }
//! }
//! ```
//!
//! `feature_names` records the column order the model was trained on. It must
//! match `FEATURE_NAMES` exactly; a reordered artifact would silently score the
//! wrong columns, so it is rejected at load time.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_NAMES, FeatureVector, Label};
use crate::error::PipelineError;
use crate::models::classifier::Classifier;
use crate::models::forest::Forest;
use crate::models::softmax::SoftmaxModel;

/// The scoring model inside an artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelKind {
    Forest(Forest),
    Softmax(SoftmaxModel),
}

impl ModelKind {
    pub fn family(&self) -> ModelFamily {
        match self {
            ModelKind::Forest(_) => ModelFamily::Forest,
            ModelKind::Softmax(_) => ModelFamily::Softmax,
        }
    }
}

/// Which kind of model an artifact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Forest,
    Softmax,
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ModelFamily::Forest => "forest",
            ModelFamily::Softmax => "softmax",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ArtifactSpec {
    feature_names: Vec<String>,
    model: ModelKind,
}

/// A loaded, validated model artifact.
///
/// The only way to obtain one is through deserialization, which checks the
/// feature order; the inner models check their own structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ArtifactSpec")]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    model: ModelKind,
}

impl TryFrom<ArtifactSpec> for ModelArtifact {
    type Error = String;

    fn try_from(spec: ArtifactSpec) -> Result<Self, Self::Error> {
        if spec.feature_names.len() != FEATURE_NAMES.len()
            || spec.feature_names.iter().zip(FEATURE_NAMES).any(|(got, want)| got != want)
        {
            return Err(format!(
                "model expects features [{}] but the pipeline produces [{}]",
                spec.feature_names.join(", "),
                FEATURE_NAMES.join(", ")
            ));
        }
        Ok(Self {
            feature_names: spec.feature_names,
            model: spec.model,
        })
    }
}

/// Short description of a loaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub kind: ModelFamily,
    pub feature_names: Vec<String>,
    /// Number of trees (forest) or classes (softmax).
    pub components: usize,
    /// Deepest tree; zero for linear models.
    pub max_depth: usize,
}

impl ModelArtifact {
    /// Parse and validate an artifact from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(text)
            .map_err(|e| PipelineError::ClassifierUnavailable(format!("invalid model JSON: {e}")))
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn model(&self) -> &ModelKind {
        &self.model
    }

    pub fn summary(&self) -> ModelSummary {
        let (components, max_depth) = match &self.model {
            ModelKind::Forest(forest) => (forest.trees().len(), forest.max_depth()),
            ModelKind::Softmax(model) => (model.classes().len(), 0),
        };
        ModelSummary {
            kind: self.model.family(),
            feature_names: self.feature_names.clone(),
            components,
            max_depth,
        }
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Label {
        match &self.model {
            ModelKind::Forest(forest) => forest.predict(features.as_slice()),
            ModelKind::Softmax(model) => model.predict(features.as_slice()),
        }
    }
}

/// Read a model artifact from disk.
///
/// Every failure maps to `ClassifierUnavailable`; callers treat it as fatal
/// at startup.
pub fn load_model(path: &Path) -> Result<ModelArtifact, PipelineError> {
    let file = File::open(path).map_err(|e| {
        PipelineError::ClassifierUnavailable(format!("failed to open model '{}': {e}", path.display()))
    })?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        PipelineError::ClassifierUnavailable(format!("invalid model JSON in '{}': {e}", path.display()))
    })?;

    let summary = artifact.summary();
    tracing::info!(
        path = %path.display(),
        kind = %summary.kind,
        components = summary.components,
        "model loaded"
    );
    Ok(artifact)
}

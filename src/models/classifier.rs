//! The scoring seam between the pipeline and a pretrained model.

use std::sync::Arc;

use crate::domain::{FeatureVector, Label};

/// A frozen, pretrained scoring function.
///
/// Implementations must not mutate internal state while predicting, so one
/// instance can serve any number of concurrent callers.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Label;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, features: &FeatureVector) -> Label {
        (**self).predict(features)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, features: &FeatureVector) -> Label {
        (**self).predict(features)
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn predict(&self, features: &FeatureVector) -> Label {
        (**self).predict(features)
    }
}

//! Environment configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Command-line flags override anything set here.
//!
//! - `EXO_MODEL`: default model artifact path (fallback `model.json`)
//! - `EXO_DOMAIN_POLICY`: `strict` (default) or `permissive`

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::domain::DomainPolicy;
use crate::error::AppError;

pub const MODEL_ENV: &str = "EXO_MODEL";
pub const POLICY_ENV: &str = "EXO_DOMAIN_POLICY";
pub const DEFAULT_MODEL_PATH: &str = "model.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model_path: PathBuf,
    pub policy: DomainPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            policy: DomainPolicy::Strict,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests avoid touching the
    /// real environment this way).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();

        if let Some(path) = lookup(MODEL_ENV).filter(|s| !s.trim().is_empty()) {
            settings.model_path = PathBuf::from(path.trim());
        }
        if let Some(policy) = lookup(POLICY_ENV).filter(|s| !s.trim().is_empty()) {
            settings.policy = DomainPolicy::from_str(policy.trim(), true)
                .map_err(|_| AppError::new(2, format!("Invalid {POLICY_ENV} '{policy}': expected strict or permissive.")))?;
        }

        Ok(settings)
    }

    /// Explicit path wins over the configured default.
    pub fn model_path<'a>(&'a self, explicit: Option<&'a Path>) -> &'a Path {
        explicit.unwrap_or(&self.model_path)
    }

    /// `--permissive` wins over the configured policy.
    pub fn policy(&self, permissive_flag: bool) -> DomainPolicy {
        if permissive_flag {
            DomainPolicy::Permissive
        } else {
            self.policy
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model_path(None), Path::new("model.json"));
    }

    #[test]
    fn reads_values_and_flags_override() {
        let settings =
            Settings::from_lookup(lookup(&[(MODEL_ENV, "/models/koi.json"), (POLICY_ENV, "Permissive")])).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("/models/koi.json"));
        assert_eq!(settings.policy, DomainPolicy::Permissive);

        let explicit = PathBuf::from("other.json");
        assert_eq!(settings.model_path(Some(explicit.as_path())), explicit.as_path());

        let strict = Settings::default();
        assert_eq!(strict.policy(true), DomainPolicy::Permissive);
        assert_eq!(strict.policy(false), DomainPolicy::Strict);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Settings::from_lookup(lookup(&[(POLICY_ENV, "lenient")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

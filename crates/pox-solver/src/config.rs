//! Resolver configuration.
//!
//! Values are layered: defaults, then a JSON file, then `POX_*` environment
//! variables. Command line flags are applied last by the caller.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::package::Stability;
use crate::solver::Pool;
use crate::util::PlatformMatcher;

/// Environment variable toggling `ignore-platform-reqs`
pub const ENV_IGNORE_PLATFORM_REQS: &str = "POX_IGNORE_PLATFORM_REQS";

/// Environment variable overriding `minimum-stability`
pub const ENV_MINIMUM_STABILITY: &str = "POX_MINIMUM_STABILITY";

/// Settings that influence rule generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolverConfig {
    /// Skip requirements on platform packages (php, ext-*, lib-*)
    pub ignore_platform_reqs: bool,

    /// Least stable version the pool exposes
    pub minimum_stability: Stability,

    /// Per-package stability overrides (package name -> stability)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub stability_flags: IndexMap<String, Stability>,

    /// Regex replacing the built-in platform package pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_pattern: Option<String>,
}

impl ResolverConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading resolver config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(value) = get(ENV_IGNORE_PLATFORM_REQS) {
            self.ignore_platform_reqs = !matches!(value.to_lowercase().as_str(), "false" | "0");
        }

        if let Some(value) = get(ENV_MINIMUM_STABILITY) {
            self.minimum_stability = value
                .parse()
                .map_err(|e| SolverError::InvalidConfig(format!("{}: {}", ENV_MINIMUM_STABILITY, e)))?;
        }

        Ok(())
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.platform_matcher().map(|_| ())
    }

    /// Matcher for platform package names honouring `platform-pattern`
    pub fn platform_matcher(&self) -> Result<PlatformMatcher> {
        match &self.platform_pattern {
            None => Ok(PlatformMatcher::new()),
            Some(pattern) => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(PlatformMatcher::with_pattern)
                .map_err(|e| SolverError::InvalidConfig(format!("platform-pattern: {}", e))),
        }
    }

    /// Apply the stability settings to a pool
    pub fn configure_pool(&self, pool: &mut Pool) {
        pool.set_minimum_stability(self.minimum_stability);
        for (name, stability) in &self.stability_flags {
            pool.add_stability_flag(name, *stability);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(!config.ignore_platform_reqs);
        assert_eq!(config.minimum_stability, Stability::Stable);
        assert!(config.stability_flags.is_empty());
        assert!(config.platform_pattern.is_none());
    }

    #[test]
    fn test_from_json_str() {
        let config = ResolverConfig::from_json_str(
            r#"{
                "ignore-platform-reqs": true,
                "minimum-stability": "beta",
                "stability-flags": {"vendor/pkg": "dev"}
            }"#,
        )
        .unwrap();

        assert!(config.ignore_platform_reqs);
        assert_eq!(config.minimum_stability, Stability::Beta);
        assert_eq!(config.stability_flags.get("vendor/pkg"), Some(&Stability::Dev));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(ResolverConfig::from_json_str("{}").unwrap(), ResolverConfig::default());
    }

    #[test]
    fn test_invalid_platform_pattern() {
        let err = ResolverConfig::from_json_str(r#"{"platform-pattern": "^(php"}"#).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig(_)));
    }

    #[test]
    fn test_platform_pattern_override() {
        let config = ResolverConfig::from_json_str(r#"{"platform-pattern": "^runtime/"}"#).unwrap();
        let matcher = config.platform_matcher().unwrap();
        assert!(matcher.is_platform("Runtime/core"));
        assert!(!matcher.is_platform("php"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ResolverConfig::default();
        config
            .apply_env_with(lookup(&[
                (ENV_IGNORE_PLATFORM_REQS, "1"),
                (ENV_MINIMUM_STABILITY, "RC"),
            ]))
            .unwrap();

        assert!(config.ignore_platform_reqs);
        assert_eq!(config.minimum_stability, Stability::RC);

        config
            .apply_env_with(lookup(&[(ENV_IGNORE_PLATFORM_REQS, "false")]))
            .unwrap();
        assert!(!config.ignore_platform_reqs);
        assert_eq!(config.minimum_stability, Stability::RC);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = ResolverConfig {
            ignore_platform_reqs: true,
            ..ResolverConfig::default()
        };
        config
            .apply_env_with(lookup(&[(ENV_IGNORE_PLATFORM_REQS, "")]))
            .unwrap();
        assert!(config.ignore_platform_reqs);
    }

    #[test]
    fn test_invalid_env_stability() {
        let mut config = ResolverConfig::default();
        let err = config
            .apply_env_with(lookup(&[(ENV_MINIMUM_STABILITY, "nightly")]))
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig(_)));
    }

    #[test]
    fn test_configure_pool() {
        let config = ResolverConfig::from_json_str(
            r#"{"minimum-stability": "dev", "stability-flags": {"a": "beta"}}"#,
        )
        .unwrap();
        let mut pool = Pool::new();
        config.configure_pool(&mut pool);
        assert_eq!(pool.minimum_stability(), Stability::Dev);
    }
}

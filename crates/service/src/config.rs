//! Service configuration, loaded from TOML.
//!
//! ```toml
//! catalog_path = "data/catalog.json"
//! recommend_timeout_ms = 2000
//!
//! [recommendation]
//! max_results = 5
//! per_seed_limit = 4
//! backfill = { seeded = 42 }   # or "ascending"
//! ```
//!
//! Every field is optional; missing ones take the defaults above.

use recommender::RecommenderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// JSON seed file the catalog is loaded from
    pub catalog_path: PathBuf,
    pub recommendation: RecommenderConfig,
    /// Budget for a single recommendation call
    pub recommend_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/catalog.json"),
            recommendation: RecommenderConfig::default(),
            recommend_timeout_ms: 2000,
        }
    }
}

impl ServiceConfig {
    /// Read and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recommend_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "recommend_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        self.recommendation
            .validate()
            .map_err(|e| ConfigError::Invalid {
                field: "recommendation".to_string(),
                message: e.to_string(),
            })
    }

    pub fn recommend_timeout(&self) -> Duration {
        Duration::from_millis(self.recommend_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recommender::BackfillOrder;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.recommend_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_full_config() {
        let config = ServiceConfig::from_toml_str(
            r#"
            catalog_path = "/srv/edulearn/catalog.json"
            recommend_timeout_ms = 500

            [recommendation]
            max_results = 3
            per_seed_limit = 2
            backfill = { seeded = 42 }
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog_path, PathBuf::from("/srv/edulearn/catalog.json"));
        assert_eq!(config.recommend_timeout_ms, 500);
        assert_eq!(config.recommendation.max_results, 3);
        assert_eq!(config.recommendation.per_seed_limit, 2);
        assert_eq!(config.recommendation.backfill, BackfillOrder::Seeded(42));
    }

    #[test]
    fn test_ascending_backfill_string() {
        let config = ServiceConfig::from_toml_str(
            r#"
            [recommendation]
            backfill = "ascending"
            "#,
        )
        .unwrap();
        assert_eq!(config.recommendation.backfill, BackfillOrder::Ascending);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ServiceConfig::from_toml_str("recommend_timeout_ms = 0");
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "recommend_timeout_ms"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = ServiceConfig::from_toml_str("[recommendation]\nmax_results = 0");
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "recommendation"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            ServiceConfig::from_toml_str("catalog = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recommend_timeout_ms = 750").unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.recommend_timeout_ms, 750);

        assert!(matches!(
            ServiceConfig::from_file("/nonexistent/edulearn.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}

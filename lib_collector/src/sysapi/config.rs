//! # Collector Configuration
//!
//! The caller-supplied configuration surface for a collection run: the
//! ordered endpoint list (failover priority), authentication mode, retry
//! budget, timeout policy, backoff tuning, and the backup record. Loadable
//! from a JSON file resolved by the `configs` module, with every field
//! individually defaultable so partial files stay valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configs::config_collector::{load_json_file, resolve_config_file, RuntimeConfigError};

use super::model::{AuthMode, SystemInfo, OS_NAME_MAX_BYTES};
use super::recovery::RecoveryContext;

/// Configuration rejected before any collection attempt.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint list is empty; there is nothing to try.
    #[error("Endpoint list is empty")]
    NoEndpoints,

    /// An endpoint is not an absolute URL.
    #[error("Endpoint '{url}' is not a valid absolute URL: {source}")]
    InvalidEndpoint {
        /// The offending endpoint string.
        url: String,
        /// The parser's rejection.
        source: url::ParseError,
    },

    /// The backup record violates the data model invariants.
    #[error("Backup record is invalid: {0}")]
    InvalidBackup(String),

    /// The configuration file could not be read or parsed.
    #[error(transparent)]
    File(#[from] RuntimeConfigError),
}

/// # Collector Config
///
/// Everything one collection run needs. Field defaults mirror the
/// behavior of the service this collector was built against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Candidate endpoint URLs, tried in order. Order is the failover priority.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// How requests authenticate.
    #[serde(default)]
    pub auth: AuthMode,

    /// Retry budget per endpoint.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Total per-call timeout for the first attempt, in seconds.
    #[serde(default = "default_base_timeout_secs")]
    pub base_timeout_secs: u64,

    /// Seconds added to the total timeout per recorded retry.
    #[serde(default = "default_timeout_increment_secs")]
    pub timeout_increment_secs: u64,

    /// Connect timeout, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// One backoff unit in milliseconds; the delay before retry `k` is
    /// `2^k` units. Production keeps the default second; tests shrink it.
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Whether to keep the literal extra backoff sleep after an endpoint's
    /// final retry, before failing over to the next endpoint.
    #[serde(default = "default_backoff_between_endpoints")]
    pub backoff_between_endpoints: bool,

    /// Known-good record substituted when every endpoint fails.
    #[serde(default = "default_backup")]
    pub backup: SystemInfo,
}

fn default_endpoints() -> Vec<String> {
    vec![
        "http://localhost:8080/api/system-info".to_string(),
        "http://127.0.0.1:8080/api/system-info".to_string(),
        "http://localhost:3000/api/system".to_string(),
    ]
}

fn default_max_retries() -> u32 {
    RecoveryContext::DEFAULT_MAX_RETRIES
}

fn default_base_timeout_secs() -> u64 {
    10
}

fn default_timeout_increment_secs() -> u64 {
    2
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_backoff_between_endpoints() -> bool {
    true
}

fn default_backup() -> SystemInfo {
    SystemInfo::new(1, 1, "Lumen")
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            auth: AuthMode::default(),
            max_retries: default_max_retries(),
            base_timeout_secs: default_base_timeout_secs(),
            timeout_increment_secs: default_timeout_increment_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            backoff_unit_ms: default_backoff_unit_ms(),
            backoff_between_endpoints: default_backoff_between_endpoints(),
            backup: default_backup(),
        }
    }
}

impl CollectorConfig {
    /// Loads the configuration from the resolved config file, falling back
    /// to defaults when no file is present. The result is validated either
    /// way.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match resolve_config_file() {
            Some(path) => load_json_file::<Self>(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = load_json_file::<Self>(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot support a single attempt.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        for endpoint in &self.endpoints {
            if let Err(source) = url::Url::parse(endpoint) {
                return Err(ConfigError::InvalidEndpoint {
                    url: endpoint.clone(),
                    source,
                });
            }
        }

        if self.backup.os_name.len() > OS_NAME_MAX_BYTES {
            return Err(ConfigError::InvalidBackup(format!(
                "os_name exceeds {} bytes",
                OS_NAME_MAX_BYTES
            )));
        }
        if self.backup.os_name.contains('\0') {
            return Err(ConfigError::InvalidBackup("os_name contains NUL".to_string()));
        }

        Ok(())
    }

    /// Total timeout for an attempt: base plus increment per recorded retry.
    pub fn timeout_for_attempt(&self, retry_count: u32) -> Duration {
        Duration::from_secs(
            self.base_timeout_secs
                .saturating_add(self.timeout_increment_secs.saturating_mul(retry_count as u64)),
        )
    }

    /// The connect timeout applied to every attempt.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid_and_match_the_service() {
        let config = CollectorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.endpoints.len(), 3);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backup, SystemInfo::new(1, 1, "Lumen"));
    }

    #[test]
    fn empty_endpoint_list_is_rejected() {
        let config = CollectorConfig {
            endpoints: Vec::new(),
            ..CollectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoEndpoints)));
    }

    #[test]
    fn relative_endpoint_urls_are_rejected() {
        let config = CollectorConfig {
            endpoints: vec!["api/system-info".to_string()],
            ..CollectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn oversized_backup_os_name_is_rejected() {
        let mut config = CollectorConfig::default();
        // Bypass the sanitizing constructor on purpose.
        config.backup.os_name = "x".repeat(OS_NAME_MAX_BYTES + 1);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBackup(_))));
    }

    #[test]
    fn timeout_escalates_per_retry() {
        let config = CollectorConfig::default();
        assert_eq!(config.timeout_for_attempt(0), Duration::from_secs(10));
        assert_eq!(config.timeout_for_attempt(1), Duration::from_secs(12));
        assert_eq!(config.timeout_for_attempt(2), Duration::from_secs(14));
    }

    #[test]
    fn partial_config_files_fill_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"endpoints": ["http://collector.internal/api/system-info"],
                "auth": {{"mode": "bearer", "token": "t-1"}}}}"#
        )
        .unwrap();

        let config = CollectorConfig::load_from(file.path()).unwrap();
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.auth, AuthMode::bearer("t-1"));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_unit_ms, 1000);
        assert!(config.backoff_between_endpoints);
    }

    #[test]
    fn invalid_config_files_surface_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            CollectorConfig::load_from(file.path()),
            Err(ConfigError::File(_))
        ));
    }
}

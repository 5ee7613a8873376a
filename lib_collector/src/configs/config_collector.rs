use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::de::DeserializeOwned;

use thiserror::Error;

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "COLLECTOR_CONFIG";

/// Default configuration file name, looked up next to the executable.
pub const CONFIG_DEFAULT_NAME: &str = "collector.config.json";

#[derive(Debug, Error)]
/// Errors raised while locating or reading a runtime configuration file.
pub enum RuntimeConfigError {
    /// An I/O error occurred while reading the file.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// The file contents were not valid JSON for the expected shape.
    #[error("Configuration parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// # Resolve Config File
///
/// Resolves the runtime configuration file, if any.
///
/// Resolution order:
/// 1. `COLLECTOR_CONFIG` environment variable, when it names an existing file.
/// 2. `collector.config.json` next to the current executable.
///
/// Returns `None` when neither location yields a file; callers then run on
/// built-in defaults.
pub fn resolve_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
        if !explicit.is_empty() {
            let path = PathBuf::from(explicit);
            if path.is_file() {
                return Some(path);
            }
        }
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let candidate = exe_dir.join(CONFIG_DEFAULT_NAME);
    if candidate.is_file() {
        Some(candidate)
    } else {
        None
    }
}

/// # Load JSON File
///
/// Reads a file and parses it as JSON into the requested shape.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, RuntimeConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        name: String,
        retries: u32,
    }

    #[test]
    fn json_files_parse_into_shapes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "edge", "retries": 5}}"#).unwrap();

        let probe: Probe = load_json_file(file.path()).unwrap();
        assert_eq!(
            probe,
            Probe {
                name: "edge".to_string(),
                retries: 5
            }
        );
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = load_json_file::<Probe>(Path::new("/nonexistent/collector.json")).unwrap_err();
        assert!(matches!(err, RuntimeConfigError::IoError(_)));
    }

    #[test]
    fn env_override_wins_when_it_names_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        env::set_var(CONFIG_ENV_VAR, file.path());
        let resolved = resolve_config_file();
        env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(resolved.as_deref(), Some(file.path()));
    }
}

//! Core runtime configuration.
//!
//! # Responsibility
//! - Load settings from an optional JSON file.
//! - Apply `ECOPART_*` environment overrides on top.
//! - Validate values before they reach db/logging bootstrap.
//!
//! # Invariants
//! - Environment values win over file values.
//! - A validated config always carries a supported log level and, when set,
//!   an absolute log directory.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ECOPART_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ECOPART_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ECOPART_LOG_DIR";

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid JSON for [`CoreConfig`].
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A value failed validation.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Settings shared by the CLI and embedding hosts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validated()
    }

    /// Loads `path` when given (defaults otherwise), then applies process
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validated()
    }

    /// Applies `ECOPART_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(db_path) = read(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(db_path.trim()));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(log_dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(log_dir.trim()));
        }
    }

    /// Normalizes the log level and checks paths.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::Invalid)?
            .to_string();

        if let Some(db_path) = &self.db_path {
            if db_path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
            }
        }
        if let Some(log_dir) = &self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    log_dir.display()
                )));
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_are_loaded_and_normalized() {
        let file = write_config(r#"{"db_path": "/var/lib/ecopart.db", "log_level": "WARNING"}"#);
        let config = CoreConfig::from_json_file(file.path()).unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/ecopart.db")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unknown_keys_and_bad_json_are_parse_errors() {
        let file = write_config(r#"{"db": "x"}"#);
        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let file = write_config("{");
        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_win_and_blank_values_are_ignored() {
        let env = HashMap::from([
            (ENV_DB_PATH, " /tmp/override.db ".to_string()),
            (ENV_LOG_LEVEL, "   ".to_string()),
            (ENV_LOG_DIR, "/tmp/ecopart-logs".to_string()),
        ]);
        let mut config = CoreConfig {
            log_level: "error".to_string(),
            ..CoreConfig::default()
        };
        config.apply_overrides(|key| env.get(key).cloned());

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.log_level, "error");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/ecopart-logs")));
    }

    #[test]
    fn validation_rejects_bad_level_and_relative_log_dir() {
        let config = CoreConfig {
            log_level: "verbose".to_string(),
            ..CoreConfig::default()
        };
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));

        let config = CoreConfig {
            log_dir: Some(PathBuf::from("logs")),
            ..CoreConfig::default()
        };
        let err = config.validated().unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }
}

//! Runtime configuration.
//!
//! Resolution order, later sources winning:
//!
//! 1. built-in defaults
//! 2. a YAML file: `--config`, else `ROSTER_CONFIG`, else `./roster.yaml`
//!    when it exists
//! 3. `ROSTER_*` environment variables (a `.env` file is loaded first)
//! 4. command-line flags, applied by the caller

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ident::{FormatError, IdFormat};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_FILE: &str = "roster.yaml";

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`RosterConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_yaml::Error,
    },
    /// An environment variable held an unusable value.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// What was wrong.
        reason: String,
    },
    /// Identifier prefix/width rejected.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Settings for the roster store and its allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Employee number prefix.
    pub id_prefix: String,
    /// Minimum digits in an employee number.
    pub id_width: usize,
    /// How long a writer waits for the database lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Most incomplete tasks one employee may hold.
    pub max_active_tasks: u32,
    /// Days past the deadline before an incomplete task counts as overdue.
    pub overdue_grace_days: u32,
    /// Days a rejected leave request stays in the employee's notices.
    pub rejection_notice_days: u32,
    /// Pins "today" for every date-dependent operation.
    pub today: Option<NaiveDate>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("roster.db"),
            id_prefix: "EMP".to_string(),
            id_width: 4,
            lock_timeout_ms: 5_000,
            max_active_tasks: 5,
            overdue_grace_days: 0,
            rejection_notice_days: 7,
            today: None,
        }
    }
}

impl RosterConfig {
    /// Loads from files and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a named config file is missing or invalid, or an
    /// environment variable cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("ROSTER_CONFIG").map(PathBuf::from));
        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_FILE).exists() => Self::from_file(Path::new(DEFAULT_FILE))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Overrides fields from `ROSTER_*` variables returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable numbers or dates.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ROSTER_DATABASE") {
            self.database = PathBuf::from(value);
        }
        if let Some(value) = lookup("ROSTER_ID_PREFIX") {
            self.id_prefix = value;
        }
        if let Some(value) = lookup("ROSTER_ID_WIDTH") {
            self.id_width = parse_env("ROSTER_ID_WIDTH", &value)?;
        }
        if let Some(value) = lookup("ROSTER_LOCK_TIMEOUT_MS") {
            self.lock_timeout_ms = parse_env("ROSTER_LOCK_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("ROSTER_MAX_ACTIVE_TASKS") {
            self.max_active_tasks = parse_env("ROSTER_MAX_ACTIVE_TASKS", &value)?;
        }
        if let Some(value) = lookup("ROSTER_OVERDUE_GRACE_DAYS") {
            self.overdue_grace_days = parse_env("ROSTER_OVERDUE_GRACE_DAYS", &value)?;
        }
        if let Some(value) = lookup("ROSTER_REJECTION_NOTICE_DAYS") {
            self.rejection_notice_days = parse_env("ROSTER_REJECTION_NOTICE_DAYS", &value)?;
        }
        if let Some(value) = lookup("ROSTER_TODAY") {
            self.today = Some(parse_env("ROSTER_TODAY", &value)?);
        }
        Ok(())
    }

    /// Checks that the identifier format is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Format`] for a bad prefix or width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.id_format().map(|_| ())
    }

    /// Identifier format built from `id_prefix` and `id_width`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Format`] for a bad prefix or width.
    pub fn id_format(&self) -> Result<IdFormat, ConfigError> {
        Ok(IdFormat::new(self.id_prefix.clone(), self.id_width)?)
    }

    /// Lock wait as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_employee_numbering() {
        let config = RosterConfig::default();
        assert_eq!(config.id_format().unwrap().format(1).as_str(), "EMP0001");
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn yaml_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.yaml");
        std::fs::write(&path, "id_prefix: STF\nmax_active_tasks: 3\n").unwrap();

        let config = RosterConfig::from_file(&path).unwrap();
        assert_eq!(config.id_prefix, "STF");
        assert_eq!(config.max_active_tasks, 3);
        assert_eq!(config.id_width, 4);
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.yaml");
        std::fs::write(&path, "id_prefx: STF\n").unwrap();
        assert!(matches!(RosterConfig::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = RosterConfig::default();
        config
            .apply_env(env(&[
                ("ROSTER_DATABASE", "/tmp/r.db"),
                ("ROSTER_ID_WIDTH", "6"),
                ("ROSTER_TODAY", "2025-02-03"),
            ]))
            .unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/r.db"));
        assert_eq!(config.id_width, 6);
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2025, 2, 3));
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut config = RosterConfig::default();
        let err = config.apply_env(env(&[("ROSTER_MAX_ACTIVE_TASKS", "many")])).unwrap_err();
        assert!(err.to_string().contains("ROSTER_MAX_ACTIVE_TASKS"));
    }

    #[test]
    fn invalid_prefix_fails_validation() {
        let config = RosterConfig { id_prefix: "E1".into(), ..RosterConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Format(_))));
    }
}

//! Runtime settings loaded from the environment.
//!
//! # Responsibility
//! - Resolve store path and logging options from `SYNCBALL_*` variables.
//!
//! # Invariants
//! - `db_path` is always non-empty after a successful load.
//! - `log_level` falls back to the build-mode default.

use crate::logging::default_log_level;
use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENV_PREFIX: &str = "SYNCBALL";
/// `db_path` value that selects a private in-memory store.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug)]
pub enum SettingsError {
    Source(ConfigError),
    MissingValue(&'static str),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "failed to load settings: {err}"),
            Self::MissingValue(key) => write!(
                f,
                "missing setting `{key}` (set {ENV_PREFIX}_{})",
                key.to_ascii_uppercase()
            ),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::MissingValue(_) => None,
        }
    }
}

impl From<ConfigError> for SettingsError {
    fn from(value: ConfigError) -> Self {
        Self::Source(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::load(None)
    }

    /// Loads settings from an explicit variable map instead of the process
    /// environment. Keys carry the `SYNCBALL_` prefix.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, SettingsError> {
        Self::load(Some(vars))
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY_DB_PATH
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, SettingsError> {
        let settings: Self = Config::builder()
            .set_default("db_path", "")?
            .set_default("log_level", default_log_level())?
            .add_source(Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()?
            .try_deserialize()?;

        if settings.db_path.trim().is_empty() {
            return Err(SettingsError::MissingValue("db_path"));
        }
        Ok(Self {
            log_dir: settings.log_dir.filter(|dir| !dir.trim().is_empty()),
            ..settings
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsError};
    use crate::logging::default_log_level;
    use config::Map;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn loads_prefixed_variables() {
        let settings = Settings::from_vars(vars(&[
            ("SYNCBALL_DB_PATH", "/var/lib/syncball/store.db"),
            ("SYNCBALL_LOG_LEVEL", "warn"),
            ("SYNCBALL_LOG_DIR", "/var/log/syncball"),
        ]))
        .unwrap();
        assert_eq!(settings.db_path, "/var/lib/syncball/store.db");
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.log_dir.as_deref(), Some("/var/log/syncball"));
        assert!(!settings.is_in_memory());
    }

    #[test]
    fn log_level_defaults_to_build_mode() {
        let settings = Settings::from_vars(vars(&[("SYNCBALL_DB_PATH", ":memory:")])).unwrap();
        assert_eq!(settings.log_level, default_log_level());
        assert_eq!(settings.log_dir, None);
        assert!(settings.is_in_memory());
    }

    #[test]
    fn missing_db_path_is_reported_by_key() {
        let err = Settings::from_vars(vars(&[("SYNCBALL_LOG_LEVEL", "info")])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingValue("db_path")));
        assert!(err.to_string().contains("SYNCBALL_DB_PATH"));
    }

    #[test]
    fn unprefixed_variables_are_ignored() {
        let err = Settings::from_vars(vars(&[("DB_PATH", "/tmp/other.db")])).unwrap_err();
        assert!(matches!(err, SettingsError::MissingValue("db_path")));
    }
}

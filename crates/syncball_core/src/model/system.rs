//! Install bookkeeping: schema version and seeded entity groups.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub current_version: String,
    #[serde(default)]
    pub installed: bool,
}

impl SystemSettings {
    pub fn new(current_version: impl Into<String>) -> Self {
        Self {
            id: 0,
            last_updated: Utc::now(),
            current_version: current_version.into(),
            installed: false,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        required("system_settings", "current_version", &self.current_version)?;
        max_len("system_settings", "current_version", &self.current_version, 100)?;
        Ok(())
    }
}

/// One install/seed run recorded under a settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallInfo {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub system_settings_id: EntityId,
    pub version: i64,
    pub install_start: DateTime<Utc>,
    pub install_end: DateTime<Utc>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub enabled_entities_applied: bool,
    /// Serialized selection of enabled countries/leagues applied at install.
    #[serde(default)]
    pub enabled_entities_json: String,
    #[serde(default)]
    pub countries_installed: bool,
    #[serde(default)]
    pub leagues_installed: bool,
    #[serde(default)]
    pub teams_installed: bool,
    #[serde(default)]
    pub fixtures_installed: bool,
}

impl InstallInfo {
    /// Starts a new, incomplete install record.
    pub fn started(system_settings_id: EntityId, version: i64, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            last_updated: at,
            system_settings_id,
            version,
            install_start: at,
            install_end: at,
            complete: false,
            enabled_entities_applied: false,
            enabled_entities_json: String::new(),
            countries_installed: false,
            leagues_installed: false,
            teams_installed: false,
            fixtures_installed: false,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        positive_id("install_info", "system_settings_id", self.system_settings_id)
    }
}

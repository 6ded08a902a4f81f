//! Country entity.
//!
//! # Invariants
//! - `name` is the natural key: required, at most 100 chars, exact match.
//! - A country referenced by any league cannot be deleted.

use super::{max_len, max_len_opt, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "country";

/// Country that owns leagues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Store-generated identity. `0` until the first flush.
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub flag_url: Option<String>,
    /// Whether downstream sync passes should follow this country.
    #[serde(default)]
    pub enabled: bool,
}

impl Country {
    /// Creates a disabled, not-yet-persisted country.
    pub fn new(name: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            id: 0,
            last_updated: Utc::now(),
            name: name.into(),
            code: code.map(str::to_string),
            flag_url: None,
            enabled: false,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        required(ENTITY, "name", &self.name)?;
        max_len(ENTITY, "name", &self.name, 100)?;
        max_len_opt(ENTITY, "code", self.code.as_deref(), 10)?;
        max_len_opt(ENTITY, "flag_url", self.flag_url.as_deref(), 200)?;
        Ok(())
    }
}

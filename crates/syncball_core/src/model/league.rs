//! League entity.
//!
//! Identity is assigned by the upstream feed, never by the store.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "league";

/// League belonging to one country and owning seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub name: String,
    /// Feed competition type, e.g. `League` or `Cup`.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub country_id: EntityId,
}

impl League {
    pub fn new(id: EntityId, name: impl Into<String>, country_id: EntityId) -> Self {
        Self {
            id,
            last_updated: Utc::now(),
            name: name.into(),
            kind: String::new(),
            logo_url: String::new(),
            enabled: false,
            country_id,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        positive_id(ENTITY, "id", self.id)?;
        positive_id(ENTITY, "country_id", self.country_id)?;
        required(ENTITY, "name", &self.name)?;
        max_len(ENTITY, "name", &self.name, 100)?;
        max_len(ENTITY, "type", &self.kind, 50)?;
        max_len(ENTITY, "logo_url", &self.logo_url, 200)?;
        Ok(())
    }
}

//! Team entity. Identity is assigned by the upstream feed.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "team";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub name: String,
    pub code: String,
    /// Country name as reported by the feed; not a foreign key.
    pub country: String,
    #[serde(default)]
    pub founded: String,
    #[serde(default)]
    pub national_team: bool,
    #[serde(default)]
    pub logo_url: String,
}

impl Team {
    pub fn validate(&self) -> ValidationResult {
        positive_id(ENTITY, "id", self.id)?;
        required(ENTITY, "name", &self.name)?;
        max_len(ENTITY, "name", &self.name, 100)?;
        required(ENTITY, "code", &self.code)?;
        max_len(ENTITY, "code", &self.code, 10)?;
        required(ENTITY, "country", &self.country)?;
        max_len(ENTITY, "country", &self.country, 50)?;
        max_len(ENTITY, "founded", &self.founded, 4)?;
        max_len(ENTITY, "logo_url", &self.logo_url, 200)?;
        Ok(())
    }
}

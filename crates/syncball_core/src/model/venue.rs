//! Venue entity. Deleting a venue removes the fixtures played there.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "venue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub surface: String,
    #[serde(default)]
    pub image_url: String,
}

impl Venue {
    pub fn validate(&self) -> ValidationResult {
        positive_id(ENTITY, "id", self.id)?;
        required(ENTITY, "name", &self.name)?;
        max_len(ENTITY, "name", &self.name, 100)?;
        max_len(ENTITY, "address", &self.address, 200)?;
        max_len(ENTITY, "city", &self.city, 100)?;
        max_len(ENTITY, "surface", &self.surface, 50)?;
        max_len(ENTITY, "image_url", &self.image_url, 200)?;
        Ok(())
    }
}

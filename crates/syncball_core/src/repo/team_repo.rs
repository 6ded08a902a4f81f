//! Team and venue mappings.
//!
//! Both use the generic repository as-is; their natural key is the
//! feed-assigned `Id`.

use crate::model::team::Team;
use crate::model::venue::Venue;
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{
    flag, int, read_flag, read_timestamp, text, timestamp, Entity, NaturalKey,
};
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::RepoResult;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

pub type TeamRepository<'s> = SqliteRepository<'s, Team>;
pub type VenueRepository<'s> = SqliteRepository<'s, Venue>;

impl Entity for Team {
    const KIND: &'static str = "team";
    const TABLE: &'static str = "Teams";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "Name",
        "Code",
        "Country",
        "Founded",
        "NationalTeam",
        "LogoUrl",
    ];
    const GENERATED_ID: bool = false;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&["Id"], vec![int(self.id)])
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            text(&self.name),
            text(&self.code),
            text(&self.country),
            text(&self.founded),
            flag(self.national_team),
            text(&self.logo_url),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            name: row.get("Name")?,
            code: row.get("Code")?,
            country: row.get("Country")?,
            founded: row.get("Founded")?,
            national_team: read_flag(row, Self::TABLE, "NationalTeam")?,
            logo_url: row.get("LogoUrl")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Team::validate(self)
    }
}

impl Entity for Venue {
    const KIND: &'static str = "venue";
    const TABLE: &'static str = "Venues";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "Name",
        "Address",
        "City",
        "Capacity",
        "Surface",
        "ImageUrl",
    ];
    const GENERATED_ID: bool = false;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&["Id"], vec![int(self.id)])
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            text(&self.name),
            text(&self.address),
            text(&self.city),
            int(self.capacity),
            text(&self.surface),
            text(&self.image_url),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            name: row.get("Name")?,
            address: row.get("Address")?,
            city: row.get("City")?,
            capacity: row.get("Capacity")?,
            surface: row.get("Surface")?,
            image_url: row.get("ImageUrl")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Venue::validate(self)
    }
}

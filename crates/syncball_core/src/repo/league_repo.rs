//! League persistence.
//!
//! # Invariants
//! - League ids come from the feed; the natural key is `Id` itself and the
//!   id is always bound on insert.
//! - A league referenced by a season cannot be deleted.

use crate::model::league::League;
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{
    flag, int, read_flag, read_timestamp, text, timestamp, Entity, NaturalKey,
};
use crate::repo::session::Session;
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::{RepoOutcome, RepoResult, Repository};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for League {
    const KIND: &'static str = "league";
    const TABLE: &'static str = "Leagues";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "Name",
        "Type",
        "LogoUrl",
        "Enabled",
        "CountryId",
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
            text(&self.kind),
            text(&self.logo_url),
            flag(self.enabled),
            int(self.country_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            name: row.get("Name")?,
            kind: row.get("Type")?,
            logo_url: row.get("LogoUrl")?,
            enabled: read_flag(row, Self::TABLE, "Enabled")?,
            country_id: row.get("CountryId")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        League::validate(self)
    }
}

/// League repository borrowing the unit-of-work session.
pub struct LeagueRepository<'s> {
    inner: SqliteRepository<'s, League>,
}

impl<'s> LeagueRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    /// Lists the leagues owned by one country; empty when `country_id <= 0`.
    pub fn get_leagues_by_country_id(&self, country_id: EntityId) -> Vec<League> {
        if country_id <= 0 {
            warn!("event=repo_list module=repo status=rejected entity=league country_id={country_id}");
            return Vec::new();
        }
        self.inner.list_where("CountryId", int(country_id))
    }

    pub fn enable_league(&self, id: EntityId) -> RepoOutcome {
        self.inner.set_enabled(id, "Enabled", true, |league| &mut league.enabled)
    }

    pub fn disable_league(&self, id: EntityId) -> RepoOutcome {
        self.inner.set_enabled(id, "Enabled", false, |league| &mut league.enabled)
    }

    pub fn get_all_enabled(&self) -> Vec<League> {
        self.inner.list_where("Enabled", flag(true))
    }
}

impl Repository<League> for LeagueRepository<'_> {
    fn get_all(&self) -> Vec<League> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<League> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut League) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &League) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

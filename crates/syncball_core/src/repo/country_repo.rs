//! Country persistence.
//!
//! # Responsibility
//! - Map `Country` onto the `Countries` table.
//! - Add name lookups and the enable/disable toggle on top of the generic
//!   repository.
//!
//! # Invariants
//! - `Name` is the natural key (exact, case-sensitive match).
//! - Enable/disable on a row already in the requested state stages
//!   nothing and leaves `LastUpdated` untouched.

use crate::model::country::Country;
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{
    flag, opt_text, read_flag, read_timestamp, text, timestamp, Entity, NaturalKey,
};
use crate::repo::session::Session;
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::{RepoError, RepoOutcome, RepoResult, Repository};
use chrono::{DateTime, Utc};
use log::error;
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for Country {
    const KIND: &'static str = "country";
    const TABLE: &'static str = "Countries";
    const COLUMNS: &'static [&'static str] =
        &["LastUpdated", "Name", "Code", "FlagUrl", "Enabled"];
    const GENERATED_ID: bool = true;

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
        NaturalKey::new(&["Name"], vec![text(&self.name)])
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            text(&self.name),
            opt_text(self.code.as_deref()),
            opt_text(self.flag_url.as_deref()),
            flag(self.enabled),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            name: row.get("Name")?,
            code: row.get("Code")?,
            flag_url: row.get("FlagUrl")?,
            enabled: read_flag(row, Self::TABLE, "Enabled")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Country::validate(self)
    }
}

/// Country repository borrowing the unit-of-work session.
pub struct CountryRepository<'s> {
    inner: SqliteRepository<'s, Country>,
}

impl<'s> CountryRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    /// Returns whether a country named exactly `name` is persisted.
    ///
    /// An empty name is a caller error. Store failures fold to `false`.
    pub fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        Ok(self.lookup_name("repo_exists_by_name", name)?.is_some())
    }

    /// Loads the country named exactly `name`. Store failures fold to `None`.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<Country>> {
        self.lookup_name("repo_find_by_name", name)
    }

    pub fn enable_country(&self, id: EntityId) -> RepoOutcome {
        self.inner.set_enabled(id, "Enabled", true, |country| &mut country.enabled)
    }

    pub fn disable_country(&self, id: EntityId) -> RepoOutcome {
        self.inner.set_enabled(id, "Enabled", false, |country| &mut country.enabled)
    }

    /// Lists enabled countries ordered by id; empty on store failure.
    pub fn get_all_enabled(&self) -> Vec<Country> {
        self.inner.list_where("Enabled", flag(true))
    }

    /// Exposes the natural-key lookup used by upsert.
    pub fn find_by_natural_key(&self, candidate: &Country) -> RepoResult<Option<Country>> {
        self.inner.find_by_natural_key(candidate)
    }

    fn lookup_name(&self, event: &str, name: &str) -> RepoResult<Option<Country>> {
        if name.is_empty() {
            return Err(RepoError::InvalidArgument(
                "country name must not be empty".to_string(),
            ));
        }
        let probe = Country::new(name, None);
        match self.inner.find_by_natural_key(&probe) {
            Ok(found) => Ok(found),
            Err(err) => {
                error!(
                    "event={event} module=repo status=error entity=country key=Name={name} error={err}"
                );
                Ok(None)
            }
        }
    }
}

impl Repository<Country> for CountryRepository<'_> {
    fn get_all(&self) -> Vec<Country> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<Country> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut Country) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &Country) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

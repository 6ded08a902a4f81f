//! Install bookkeeping persistence.
//!
//! `SystemSettings` is keyed by `CurrentVersion`; `InstallInfo` by
//! `(SystemSettingsId, Version)`. Deleting settings removes their install
//! records.

use crate::model::system::{InstallInfo, SystemSettings};
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{
    flag, int, read_flag, read_timestamp, text, timestamp, Entity, NaturalKey,
};
use crate::repo::session::Session;
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::{RepoOutcome, RepoResult, Repository};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

pub type SystemSettingsRepository<'s> = SqliteRepository<'s, SystemSettings>;

impl Entity for SystemSettings {
    const KIND: &'static str = "system_settings";
    const TABLE: &'static str = "SystemSettings";
    const COLUMNS: &'static [&'static str] = &["LastUpdated", "CurrentVersion", "Installed"];
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
        NaturalKey::new(&["CurrentVersion"], vec![text(&self.current_version)])
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            text(&self.current_version),
            flag(self.installed),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            current_version: row.get("CurrentVersion")?,
            installed: read_flag(row, Self::TABLE, "Installed")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        SystemSettings::validate(self)
    }
}

impl Entity for InstallInfo {
    const KIND: &'static str = "install_info";
    const TABLE: &'static str = "InstallInfo";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "SystemSettingsId",
        "Version",
        "InstallStart",
        "InstallEnd",
        "Complete",
        "EnabledEntitiesApplied",
        "EnabledEntitiesJson",
        "CountriesInstalled",
        "LeaguesInstalled",
        "TeamsInstalled",
        "FixturesInstalled",
    ];
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
        NaturalKey::new(
            &["SystemSettingsId", "Version"],
            vec![int(self.system_settings_id), int(self.version)],
        )
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            int(self.system_settings_id),
            int(self.version),
            timestamp(self.install_start),
            timestamp(self.install_end),
            flag(self.complete),
            flag(self.enabled_entities_applied),
            text(&self.enabled_entities_json),
            flag(self.countries_installed),
            flag(self.leagues_installed),
            flag(self.teams_installed),
            flag(self.fixtures_installed),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let table = Self::TABLE;
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, table, "LastUpdated")?,
            system_settings_id: row.get("SystemSettingsId")?,
            version: row.get("Version")?,
            install_start: read_timestamp(row, table, "InstallStart")?,
            install_end: read_timestamp(row, table, "InstallEnd")?,
            complete: read_flag(row, table, "Complete")?,
            enabled_entities_applied: read_flag(row, table, "EnabledEntitiesApplied")?,
            enabled_entities_json: row.get("EnabledEntitiesJson")?,
            countries_installed: read_flag(row, table, "CountriesInstalled")?,
            leagues_installed: read_flag(row, table, "LeaguesInstalled")?,
            teams_installed: read_flag(row, table, "TeamsInstalled")?,
            fixtures_installed: read_flag(row, table, "FixturesInstalled")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        InstallInfo::validate(self)
    }
}

pub struct InstallInfoRepository<'s> {
    inner: SqliteRepository<'s, InstallInfo>,
}

impl<'s> InstallInfoRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    /// Lists install runs recorded under one settings row, oldest first.
    pub fn get_by_settings_id(&self, system_settings_id: EntityId) -> Vec<InstallInfo> {
        if system_settings_id <= 0 {
            return Vec::new();
        }
        self.inner.list_where("SystemSettingsId", int(system_settings_id))
    }
}

impl Repository<InstallInfo> for InstallInfoRepository<'_> {
    fn get_all(&self) -> Vec<InstallInfo> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<InstallInfo> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut InstallInfo) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &InstallInfo) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

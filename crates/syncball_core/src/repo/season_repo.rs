//! Season and coverage persistence.
//!
//! # Invariants
//! - A season is identified by `(LeagueId, Year)`; its coverage by
//!   `SeasonId`, which is unique in the store.
//! - Coverage rows are only written after their season has a store id.

use crate::model::season::{Coverage, Season};
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{
    flag, int, read_flag, read_timestamp, text, timestamp, Entity, NaturalKey,
};
use crate::repo::session::Session;
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::{RepoError, RepoOutcome, RepoResult, Repository};
use chrono::{DateTime, Utc};
use log::error;
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for Season {
    const KIND: &'static str = "season";
    const TABLE: &'static str = "Seasons";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "LeagueId",
        "Year",
        "StartDate",
        "EndDate",
        "Current",
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
            &["LeagueId", "Year"],
            vec![int(self.league_id), text(&self.year)],
        )
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            int(self.league_id),
            text(&self.year),
            text(&self.start_date),
            text(&self.end_date),
            flag(self.current),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            league_id: row.get("LeagueId")?,
            year: row.get("Year")?,
            start_date: row.get("StartDate")?,
            end_date: row.get("EndDate")?,
            current: read_flag(row, Self::TABLE, "Current")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Season::validate(self)
    }
}

pub struct SeasonRepository<'s> {
    inner: SqliteRepository<'s, Season>,
}

impl<'s> SeasonRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    pub fn get_by_league_id(&self, league_id: EntityId) -> Vec<Season> {
        if league_id <= 0 {
            return Vec::new();
        }
        self.inner.list_where("LeagueId", int(league_id))
    }

    /// Resolves a season by its natural key.
    ///
    /// An empty year or non-positive league id is a caller error; store
    /// failures fold to `None`.
    pub fn find_by_league_and_year(
        &self,
        league_id: EntityId,
        year: &str,
    ) -> RepoResult<Option<Season>> {
        if league_id <= 0 || year.is_empty() {
            return Err(RepoError::InvalidArgument(format!(
                "season lookup needs a positive league id and a year, got league_id={league_id} year=`{year}`"
            )));
        }
        let probe = Season::new(league_id, year, "", "");
        match self.inner.find_by_natural_key(&probe) {
            Ok(found) => Ok(found),
            Err(err) => {
                error!(
                    "event=repo_find module=repo status=error entity=season key=LeagueId={league_id},Year={year} error={err}"
                );
                Ok(None)
            }
        }
    }

    /// Returns the season flagged current for `league_id`, if any.
    pub fn get_current(&self, league_id: EntityId) -> Option<Season> {
        self.get_by_league_id(league_id)
            .into_iter()
            .find(|season| season.current)
    }
}

impl Repository<Season> for SeasonRepository<'_> {
    fn get_all(&self) -> Vec<Season> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<Season> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut Season) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &Season) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

impl Entity for Coverage {
    const KIND: &'static str = "coverage";
    const TABLE: &'static str = "Coverage";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "SeasonId",
        "Events",
        "Lineups",
        "FixtureStats",
        "PlayerStats",
        "Standings",
        "Players",
        "TopScorers",
        "TopAssists",
        "TopCards",
        "Injuries",
        "Predictions",
        "Odds",
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
        NaturalKey::new(&["SeasonId"], vec![int(self.season_id)])
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            int(self.season_id),
            flag(self.events),
            flag(self.lineups),
            flag(self.fixture_stats),
            flag(self.player_stats),
            flag(self.standings),
            flag(self.players),
            flag(self.top_scorers),
            flag(self.top_assists),
            flag(self.top_cards),
            flag(self.injuries),
            flag(self.predictions),
            flag(self.odds),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let table = Self::TABLE;
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, table, "LastUpdated")?,
            season_id: row.get("SeasonId")?,
            events: read_flag(row, table, "Events")?,
            lineups: read_flag(row, table, "Lineups")?,
            fixture_stats: read_flag(row, table, "FixtureStats")?,
            player_stats: read_flag(row, table, "PlayerStats")?,
            standings: read_flag(row, table, "Standings")?,
            players: read_flag(row, table, "Players")?,
            top_scorers: read_flag(row, table, "TopScorers")?,
            top_assists: read_flag(row, table, "TopAssists")?,
            top_cards: read_flag(row, table, "TopCards")?,
            injuries: read_flag(row, table, "Injuries")?,
            predictions: read_flag(row, table, "Predictions")?,
            odds: read_flag(row, table, "Odds")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Coverage::validate(self)
    }
}

pub struct CoverageRepository<'s> {
    inner: SqliteRepository<'s, Coverage>,
}

impl<'s> CoverageRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    /// Loads the single coverage row of a season.
    pub fn get_by_season_id(&self, season_id: EntityId) -> Option<Coverage> {
        if season_id <= 0 {
            return None;
        }
        self.inner
            .list_where("SeasonId", int(season_id))
            .into_iter()
            .next()
    }
}

impl Repository<Coverage> for CoverageRepository<'_> {
    fn get_all(&self) -> Vec<Coverage> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<Coverage> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut Coverage) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &Coverage) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

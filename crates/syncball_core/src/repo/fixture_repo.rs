//! Fixture and fixture-statistics persistence.
//!
//! # Invariants
//! - Fixture ids come from the feed and are bound on insert.
//! - Statistics are identified by `(FixtureId, TeamId)`; deleting a fixture
//!   removes them in the store.

use crate::model::fixture::{Fixture, FixtureStats, Score};
use crate::model::{EntityId, ModelValidationError};
use crate::repo::entity::{int, read_timestamp, text, timestamp, Entity, NaturalKey};
use crate::repo::session::Session;
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::{RepoOutcome, RepoResult, Repository};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

impl Entity for Fixture {
    const KIND: &'static str = "fixture";
    const TABLE: &'static str = "Fixtures";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "Referee",
        "Timezone",
        "StartTime",
        "Timestamp",
        "VenueId",
        "Status",
        "TimeElapsed",
        "LeagueId",
        "SeasonId",
        "Round",
        "HomeTeamId",
        "AwayTeamId",
        "GoalsHomeTeam",
        "GoalsAwayTeam",
        "GoalsHomeTeamHT",
        "GoalsAwayTeamHT",
        "GoalsHomeTeamFT",
        "GoalsAwayTeamFT",
        "GoalsHomeTeamET",
        "GoalsAwayTeamET",
        "GoalsHomeTeamPen",
        "GoalsAwayTeamPen",
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
        let score = &self.score;
        vec![
            timestamp(self.last_updated),
            text(&self.referee),
            text(&self.timezone),
            timestamp(self.start_time),
            text(&self.timestamp),
            int(self.venue_id),
            text(&self.status),
            int(self.time_elapsed),
            int(self.league_id),
            int(self.season_id),
            text(&self.round),
            int(self.home_team_id),
            int(self.away_team_id),
            int(score.home),
            int(score.away),
            int(score.home_half_time),
            int(score.away_half_time),
            int(score.home_full_time),
            int(score.away_full_time),
            int(score.home_extra_time),
            int(score.away_extra_time),
            int(score.home_penalties),
            int(score.away_penalties),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            referee: row.get("Referee")?,
            timezone: row.get("Timezone")?,
            start_time: read_timestamp(row, Self::TABLE, "StartTime")?,
            timestamp: row.get("Timestamp")?,
            venue_id: row.get("VenueId")?,
            status: row.get("Status")?,
            time_elapsed: row.get("TimeElapsed")?,
            league_id: row.get("LeagueId")?,
            season_id: row.get("SeasonId")?,
            round: row.get("Round")?,
            home_team_id: row.get("HomeTeamId")?,
            away_team_id: row.get("AwayTeamId")?,
            score: Score {
                home: row.get("GoalsHomeTeam")?,
                away: row.get("GoalsAwayTeam")?,
                home_half_time: row.get("GoalsHomeTeamHT")?,
                away_half_time: row.get("GoalsAwayTeamHT")?,
                home_full_time: row.get("GoalsHomeTeamFT")?,
                away_full_time: row.get("GoalsAwayTeamFT")?,
                home_extra_time: row.get("GoalsHomeTeamET")?,
                away_extra_time: row.get("GoalsAwayTeamET")?,
                home_penalties: row.get("GoalsHomeTeamPen")?,
                away_penalties: row.get("GoalsAwayTeamPen")?,
            },
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        Fixture::validate(self)
    }
}

pub struct FixtureRepository<'s> {
    inner: SqliteRepository<'s, Fixture>,
}

impl<'s> FixtureRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    pub fn get_by_league_id(&self, league_id: EntityId) -> Vec<Fixture> {
        if league_id <= 0 {
            return Vec::new();
        }
        self.inner.list_where("LeagueId", int(league_id))
    }

    pub fn get_by_season_id(&self, season_id: EntityId) -> Vec<Fixture> {
        if season_id <= 0 {
            return Vec::new();
        }
        self.inner.list_where("SeasonId", int(season_id))
    }
}

impl Repository<Fixture> for FixtureRepository<'_> {
    fn get_all(&self) -> Vec<Fixture> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<Fixture> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut Fixture) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &Fixture) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

impl Entity for FixtureStats {
    const KIND: &'static str = "fixture_stats";
    const TABLE: &'static str = "FixtureStats";
    const COLUMNS: &'static [&'static str] = &[
        "LastUpdated",
        "FixtureId",
        "TeamId",
        "ShotsOnGoal",
        "ShotsOffGoal",
        "TotalShots",
        "BlockedShots",
        "ShotsInsideBox",
        "ShotsOutsideBox",
        "Fouls",
        "CornerKicks",
        "Offsides",
        "BallPossession",
        "YellowCards",
        "RedCards",
        "GoalkeeperSaves",
        "TotalPasses",
        "PassesAccurate",
        "PassesPercentage",
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
            &["FixtureId", "TeamId"],
            vec![int(self.fixture_id), int(self.team_id)],
        )
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            timestamp(self.last_updated),
            int(self.fixture_id),
            int(self.team_id),
            int(self.shots_on_goal),
            int(self.shots_off_goal),
            int(self.total_shots),
            int(self.blocked_shots),
            int(self.shots_inside_box),
            int(self.shots_outside_box),
            int(self.fouls),
            int(self.corner_kicks),
            int(self.offsides),
            int(self.ball_possession),
            int(self.yellow_cards),
            int(self.red_cards),
            int(self.goalkeeper_saves),
            int(self.total_passes),
            int(self.passes_accurate),
            int(self.passes_percentage),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("Id")?,
            last_updated: read_timestamp(row, Self::TABLE, "LastUpdated")?,
            fixture_id: row.get("FixtureId")?,
            team_id: row.get("TeamId")?,
            shots_on_goal: row.get("ShotsOnGoal")?,
            shots_off_goal: row.get("ShotsOffGoal")?,
            total_shots: row.get("TotalShots")?,
            blocked_shots: row.get("BlockedShots")?,
            shots_inside_box: row.get("ShotsInsideBox")?,
            shots_outside_box: row.get("ShotsOutsideBox")?,
            fouls: row.get("Fouls")?,
            corner_kicks: row.get("CornerKicks")?,
            offsides: row.get("Offsides")?,
            ball_possession: row.get("BallPossession")?,
            yellow_cards: row.get("YellowCards")?,
            red_cards: row.get("RedCards")?,
            goalkeeper_saves: row.get("GoalkeeperSaves")?,
            total_passes: row.get("TotalPasses")?,
            passes_accurate: row.get("PassesAccurate")?,
            passes_percentage: row.get("PassesPercentage")?,
        })
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        FixtureStats::validate(self)
    }
}

pub struct FixtureStatsRepository<'s> {
    inner: SqliteRepository<'s, FixtureStats>,
}

impl<'s> FixtureStatsRepository<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            inner: SqliteRepository::new(session),
        }
    }

    /// Lists both sides' statistics for one fixture.
    pub fn get_by_fixture_id(&self, fixture_id: EntityId) -> Vec<FixtureStats> {
        if fixture_id <= 0 {
            return Vec::new();
        }
        self.inner.list_where("FixtureId", int(fixture_id))
    }
}

impl Repository<FixtureStats> for FixtureStatsRepository<'_> {
    fn get_all(&self) -> Vec<FixtureStats> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> Option<FixtureStats> {
        self.inner.get_by_id(id)
    }

    fn exists(&self, id: EntityId) -> bool {
        self.inner.exists(id)
    }

    fn upsert(&self, entity: &mut FixtureStats) -> RepoOutcome {
        self.inner.upsert(entity)
    }

    fn delete(&self, entity: &FixtureStats) -> RepoOutcome {
        self.inner.delete(entity)
    }
}

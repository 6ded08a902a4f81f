//! Fixture and per-team fixture statistics.
//!
//! # Invariants
//! - Fixture identity is assigned by the upstream feed.
//! - League, season and both teams must exist before a fixture is flushed.
//! - Deleting a fixture removes its statistics rows.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const FIXTURE: &str = "fixture";
const FIXTURE_STATS: &str = "fixture_stats";

/// Final, half-time, extra-time and penalty goals for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub home: i64,
    pub away: i64,
    pub home_half_time: i64,
    pub away_half_time: i64,
    pub home_full_time: i64,
    pub away_full_time: i64,
    pub home_extra_time: i64,
    pub away_extra_time: i64,
    pub home_penalties: i64,
    pub away_penalties: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub referee: String,
    pub timezone: String,
    pub start_time: DateTime<Utc>,
    /// Feed-provided kickoff timestamp, kept verbatim.
    pub timestamp: String,
    pub venue_id: EntityId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub time_elapsed: i64,
    pub league_id: EntityId,
    pub season_id: EntityId,
    #[serde(default)]
    pub round: String,
    pub home_team_id: EntityId,
    pub away_team_id: EntityId,
    #[serde(default)]
    pub score: Score,
}

impl Fixture {
    pub fn validate(&self) -> ValidationResult {
        positive_id(FIXTURE, "id", self.id)?;
        positive_id(FIXTURE, "venue_id", self.venue_id)?;
        positive_id(FIXTURE, "league_id", self.league_id)?;
        positive_id(FIXTURE, "season_id", self.season_id)?;
        positive_id(FIXTURE, "home_team_id", self.home_team_id)?;
        positive_id(FIXTURE, "away_team_id", self.away_team_id)?;
        max_len(FIXTURE, "referee", &self.referee, 100)?;
        required(FIXTURE, "timezone", &self.timezone)?;
        max_len(FIXTURE, "timezone", &self.timezone, 100)?;
        required(FIXTURE, "timestamp", &self.timestamp)?;
        max_len(FIXTURE, "timestamp", &self.timestamp, 100)?;
        max_len(FIXTURE, "status", &self.status, 100)?;
        max_len(FIXTURE, "round", &self.round, 50)?;
        Ok(())
    }
}

/// Statistics of one team in one fixture, keyed by `(fixture_id, team_id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureStats {
    pub id: EntityId,
    pub last_updated: DateTime<Utc>,
    pub fixture_id: EntityId,
    pub team_id: EntityId,
    pub shots_on_goal: i64,
    pub shots_off_goal: i64,
    pub total_shots: i64,
    pub blocked_shots: i64,
    pub shots_inside_box: i64,
    pub shots_outside_box: i64,
    pub fouls: i64,
    pub corner_kicks: i64,
    pub offsides: i64,
    /// Percentage, 0..=100.
    pub ball_possession: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub goalkeeper_saves: i64,
    pub total_passes: i64,
    pub passes_accurate: i64,
    pub passes_percentage: i64,
}

impl FixtureStats {
    pub fn validate(&self) -> ValidationResult {
        positive_id(FIXTURE_STATS, "fixture_id", self.fixture_id)?;
        positive_id(FIXTURE_STATS, "team_id", self.team_id)?;
        Ok(())
    }
}

//! Season and its coverage flags.
//!
//! # Invariants
//! - One season has exactly one coverage row (unique `Coverage.SeasonId`).
//! - Deleting a season removes its coverage.
//! - Every coverage flag is required; there is no "unknown" state.

use super::{max_len, positive_id, required, EntityId, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One league season, keyed naturally by `(league_id, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub league_id: EntityId,
    /// Season label, `2024` or `2024/2025`.
    pub year: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
}

impl Season {
    pub fn new(
        league_id: EntityId,
        year: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            last_updated: Utc::now(),
            league_id,
            year: year.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            current: false,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        positive_id("season", "league_id", self.league_id)?;
        required("season", "year", &self.year)?;
        max_len("season", "year", &self.year, 9)?;
        required("season", "start_date", &self.start_date)?;
        required("season", "end_date", &self.end_date)?;
        Ok(())
    }
}

/// Data-availability flags for one season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    pub id: EntityId,
    pub last_updated: DateTime<Utc>,
    pub season_id: EntityId,
    pub events: bool,
    pub lineups: bool,
    pub fixture_stats: bool,
    pub player_stats: bool,
    pub standings: bool,
    pub players: bool,
    pub top_scorers: bool,
    pub top_assists: bool,
    pub top_cards: bool,
    pub injuries: bool,
    pub predictions: bool,
    pub odds: bool,
}

impl Coverage {
    pub fn validate(&self) -> ValidationResult {
        positive_id("coverage", "season_id", self.season_id)
    }
}

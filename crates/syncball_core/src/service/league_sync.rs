//! League sync pass.
//!
//! # Responsibility
//! - Persist one feed league (country, league, seasons, coverage) through
//!   the unit of work in dependency order.
//! - Report per-entity outcomes so callers can audit skipped items.
//!
//! # Invariants
//! - The whole pass runs inside one explicit transaction.
//! - A child is only upserted after its parent's upsert was applied; the
//!   parent's generated id is resolved by natural key after a flush.
//! - A rejected item is skipped and logged; a store failure rolls the
//!   transaction back and is returned.

use crate::model::country::Country;
use crate::model::league::League;
use crate::model::season::{Coverage, Season};
use crate::model::EntityId;
use crate::repo::manager::RepositoryManager;
use crate::repo::session::CancelFlag;
use crate::repo::{RepoError, RepoOutcome, RepoResult, Repository};
use log::{error, info, warn};
use serde::Deserialize;
use std::time::Instant;

/// One league as delivered by the upstream feed.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSyncItem {
    pub country: Country,
    pub league: League,
    #[serde(default)]
    pub seasons: Vec<SeasonSyncItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonSyncItem {
    pub season: Season,
    #[serde(default)]
    pub coverage: Coverage,
}

/// Outcome of one season and its coverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSyncOutcome {
    pub year: String,
    pub season: RepoOutcome,
    /// Store id of the season; `None` when its upsert was rejected.
    pub season_id: Option<EntityId>,
    /// `None` when the season was rejected and coverage was skipped.
    pub coverage: Option<RepoOutcome>,
}

/// Result of one league sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSyncReport {
    pub country: RepoOutcome,
    pub country_id: Option<EntityId>,
    /// `None` when the country was rejected and the league was skipped.
    pub league: Option<RepoOutcome>,
    pub seasons: Vec<SeasonSyncOutcome>,
    /// Rows affected across every flush of the pass.
    pub rows_written: usize,
}

impl LeagueSyncReport {
    fn skipped(country: RepoOutcome) -> Self {
        Self {
            country,
            country_id: None,
            league: None,
            seasons: Vec::new(),
            rows_written: 0,
        }
    }
}

/// Sync-pass service borrowing a unit of work.
pub struct LeagueSyncService<'m> {
    manager: &'m RepositoryManager,
}

impl<'m> LeagueSyncService<'m> {
    pub fn new(manager: &'m RepositoryManager) -> Self {
        Self { manager }
    }

    /// Persists `item` and commits.
    ///
    /// # Errors
    /// - `RepoError::TransactionState` when a transaction is already open.
    /// - Any flush failure; the transaction is rolled back first.
    pub fn sync(&self, item: LeagueSyncItem) -> RepoResult<LeagueSyncReport> {
        self.run(item, None)
    }

    /// Same as [`Self::sync`], aborting between writes when `cancel` is
    /// raised.
    pub fn sync_cancellable(
        &self,
        item: LeagueSyncItem,
        cancel: &CancelFlag,
    ) -> RepoResult<LeagueSyncReport> {
        self.run(item, Some(cancel))
    }

    fn run(
        &self,
        item: LeagueSyncItem,
        cancel: Option<&CancelFlag>,
    ) -> RepoResult<LeagueSyncReport> {
        let started_at = Instant::now();
        let league_id = item.league.id;
        self.manager.begin_transaction()?;

        let result = self
            .sync_in_transaction(item, cancel)
            .and_then(|mut report| {
                report.rows_written += self.manager.commit_transaction()?;
                Ok(report)
            });
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                if let Err(rollback_err) = self.manager.rollback_transaction() {
                    warn!("event=league_sync module=sync status=error error_code=rollback_failed error={rollback_err}");
                }
                error!(
                    "event=league_sync module=sync status=error league_id={league_id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err);
            }
        };

        info!(
            "event=league_sync module=sync status=ok league_id={league_id} seasons={} rows={} duration_ms={}",
            report.seasons.len(),
            report.rows_written,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn sync_in_transaction(
        &self,
        item: LeagueSyncItem,
        cancel: Option<&CancelFlag>,
    ) -> RepoResult<LeagueSyncReport> {
        let LeagueSyncItem {
            mut country,
            mut league,
            seasons,
        } = item;

        let country_outcome = self.manager.countries().upsert(&mut country);
        if !country_outcome.is_applied() {
            warn!(
                "event=league_sync module=sync status=skipped entity=league league_id={} reason=country_rejected",
                league.id
            );
            return Ok(LeagueSyncReport::skipped(country_outcome));
        }
        let mut rows_written = self.flush(cancel)?;
        let country_id = self.resolve_country_id(&country)?;

        league.country_id = country_id;
        let league_outcome = self.manager.leagues().upsert(&mut league);
        if !league_outcome.is_applied() {
            warn!(
                "event=league_sync module=sync status=skipped entity=season league_id={} reason=league_rejected",
                league.id
            );
            return Ok(LeagueSyncReport {
                country: country_outcome,
                country_id: Some(country_id),
                league: Some(league_outcome),
                seasons: Vec::new(),
                rows_written,
            });
        }
        rows_written += self.flush(cancel)?;

        let mut season_outcomes = Vec::with_capacity(seasons.len());
        for SeasonSyncItem {
            mut season,
            mut coverage,
        } in seasons
        {
            season.league_id = league.id;
            let season_outcome = self.manager.seasons().upsert(&mut season);
            if !season_outcome.is_applied() {
                warn!(
                    "event=league_sync module=sync status=skipped entity=coverage league_id={} year={} reason=season_rejected",
                    league.id, season.year
                );
                season_outcomes.push(SeasonSyncOutcome {
                    year: season.year,
                    season: season_outcome,
                    season_id: None,
                    coverage: None,
                });
                continue;
            }
            rows_written += self.flush(cancel)?;
            let season_id = self.resolve_season_id(&season)?;

            coverage.season_id = season_id;
            let coverage_outcome = self.manager.coverage().upsert(&mut coverage);
            if coverage_outcome.is_applied() {
                rows_written += self.flush(cancel)?;
            }
            season_outcomes.push(SeasonSyncOutcome {
                year: season.year,
                season: season_outcome,
                season_id: Some(season_id),
                coverage: Some(coverage_outcome),
            });
        }

        Ok(LeagueSyncReport {
            country: country_outcome,
            country_id: Some(country_id),
            league: Some(league_outcome),
            seasons: season_outcomes,
            rows_written,
        })
    }

    fn flush(&self, cancel: Option<&CancelFlag>) -> RepoResult<usize> {
        match cancel {
            Some(cancel) => self.manager.complete_cancellable(cancel),
            None => self.manager.complete(),
        }
    }

    fn resolve_country_id(&self, country: &Country) -> RepoResult<EntityId> {
        self.manager
            .countries()
            .find_by_name(&country.name)?
            .map(|stored| stored.id)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "country `{}` missing after flush",
                    country.name
                ))
            })
    }

    fn resolve_season_id(&self, season: &Season) -> RepoResult<EntityId> {
        self.manager
            .seasons()
            .find_by_league_and_year(season.league_id, &season.year)?
            .map(|stored| stored.id)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "season {}/{} missing after flush",
                    season.league_id, season.year
                ))
            })
    }
}

//! Unit of work over one SQLite connection.
//!
//! # Responsibility
//! - Hand out repository handles that borrow one shared session.
//! - Flush staged writes as one atomic batch (`complete`).
//! - Delimit explicit transactions and trigger schema migration.
//!
//! # Invariants
//! - `Idle -> begin -> InTransaction -> commit | rollback -> Idle`.
//! - `complete` while `Idle` commits the batch; while `InTransaction` it
//!   joins the open transaction and leaves it open.
//! - Migration never runs inside an explicit transaction.
//! - Dropping the manager while `InTransaction` rolls back.

use crate::db::{migrations, open_db, open_db_in_memory};
use crate::repo::country_repo::CountryRepository;
use crate::repo::fixture_repo::{FixtureRepository, FixtureStatsRepository};
use crate::repo::install_repo::{InstallInfoRepository, SystemSettingsRepository};
use crate::repo::league_repo::LeagueRepository;
use crate::repo::season_repo::{CoverageRepository, SeasonRepository};
use crate::repo::session::{CancelFlag, Session, TransactionState};
use crate::repo::sqlite_repo::SqliteRepository;
use crate::repo::team_repo::{TeamRepository, VenueRepository};
use crate::repo::RepoResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Aggregates repositories sharing one session.
///
/// Not safe for concurrent use; one manager models one logical job.
pub struct RepositoryManager {
    session: Session,
}

impl RepositoryManager {
    /// Wraps an already configured connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            session: Session::new(conn),
        }
    }

    /// Opens a file-backed store. Does not migrate.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn countries(&self) -> CountryRepository<'_> {
        CountryRepository::new(&self.session)
    }

    pub fn leagues(&self) -> LeagueRepository<'_> {
        LeagueRepository::new(&self.session)
    }

    pub fn seasons(&self) -> SeasonRepository<'_> {
        SeasonRepository::new(&self.session)
    }

    pub fn coverage(&self) -> CoverageRepository<'_> {
        CoverageRepository::new(&self.session)
    }

    pub fn teams(&self) -> TeamRepository<'_> {
        SqliteRepository::new(&self.session)
    }

    pub fn venues(&self) -> VenueRepository<'_> {
        SqliteRepository::new(&self.session)
    }

    pub fn fixtures(&self) -> FixtureRepository<'_> {
        FixtureRepository::new(&self.session)
    }

    pub fn fixture_stats(&self) -> FixtureStatsRepository<'_> {
        FixtureStatsRepository::new(&self.session)
    }

    pub fn system_settings(&self) -> SystemSettingsRepository<'_> {
        SqliteRepository::new(&self.session)
    }

    pub fn install_info(&self) -> InstallInfoRepository<'_> {
        InstallInfoRepository::new(&self.session)
    }

    /// Flushes every staged write and returns the affected row count.
    ///
    /// # Errors
    /// - Store failure on any staged write. The batch is rolled back and
    ///   dropped; an explicit transaction, if open, stays open.
    pub fn complete(&self) -> RepoResult<usize> {
        self.session.flush(None)
    }

    /// Same as [`Self::complete`], checking `cancel` before every write.
    pub fn complete_cancellable(&self, cancel: &CancelFlag) -> RepoResult<usize> {
        self.session.flush(Some(cancel))
    }

    pub fn begin_transaction(&self) -> RepoResult<()> {
        self.session.begin()
    }

    /// Flushes pending writes and commits; returns rows affected by the
    /// final flush.
    pub fn commit_transaction(&self) -> RepoResult<usize> {
        self.session.commit()
    }

    /// Rolls back the open transaction and drops staged writes.
    pub fn rollback_transaction(&self) -> RepoResult<()> {
        self.session.rollback()
    }

    /// Applies pending schema migrations and returns how many ran.
    ///
    /// # Errors
    /// - `RepoError::TransactionState` while a transaction is open.
    /// - `DbError::UnsupportedSchemaVersion` when the store is newer than
    ///   this binary.
    pub fn migrate(&self) -> RepoResult<u32> {
        self.session.require_state("migrate", TransactionState::Idle)?;
        let started_at = Instant::now();
        match migrations::apply_migrations(self.session.conn()) {
            Ok(applied) => {
                info!(
                    "event=uow_migrate module=uow status=ok applied={applied} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(applied)
            }
            Err(err) => {
                error!(
                    "event=uow_migrate module=uow status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    pub fn schema_version(&self) -> RepoResult<u32> {
        Ok(migrations::current_version(self.session.conn())?)
    }

    /// Drops staged writes without touching the store.
    pub fn discard_staged(&self) -> usize {
        self.session.discard()
    }

    pub fn staged_count(&self) -> usize {
        self.session.staged_count()
    }

    pub fn state(&self) -> TransactionState {
        self.session.state()
    }

    /// Raw connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        self.session.conn()
    }
}

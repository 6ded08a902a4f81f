//! Core persistence layer for the syncball sports store.
//! Owns the domain model, schema, repositories and unit of work.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::country::Country;
pub use model::fixture::{Fixture, FixtureStats, Score};
pub use model::league::League;
pub use model::season::{Coverage, Season};
pub use model::system::{InstallInfo, SystemSettings};
pub use model::team::Team;
pub use model::venue::Venue;
pub use model::{EntityId, ModelValidationError};
pub use repo::manager::RepositoryManager;
pub use repo::session::{CancelFlag, TransactionState};
pub use repo::{RepoError, RepoOutcome, RepoResult, Repository};
pub use service::league_sync::{
    LeagueSyncItem, LeagueSyncReport, LeagueSyncService, SeasonSyncItem, SeasonSyncOutcome,
};
pub use settings::{Settings, SettingsError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

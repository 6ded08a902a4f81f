//! Repository layer and unit of work.
//!
//! # Responsibility
//! - Define the generic CRUD contract shared by every entity.
//! - Keep SQL details inside the persistence boundary.
//! - Coordinate repositories that share one session as a unit of work.
//!
//! # Invariants
//! - Mutations are staged on the shared session; nothing is durable until
//!   `RepositoryManager::complete` flushes the batch.
//! - Read operations never fail past this boundary: store errors are logged
//!   and folded into empty/absent results.
//! - Write operations report through `RepoOutcome`, never by panicking.

use crate::db::DbError;
use crate::model::{EntityId, ModelValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod country_repo;
pub mod entity;
pub mod fixture_repo;
pub mod install_repo;
pub mod league_repo;
pub mod manager;
pub mod season_repo;
pub mod session;
pub mod sqlite_repo;
pub mod team_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from operations that return `Result` (natural-key lookups,
/// flushing, transaction control, migration).
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    /// Caller broke an input contract, e.g. an empty natural key.
    InvalidArgument(String),
    /// Persisted row cannot be decoded into an entity.
    InvalidData(String),
    /// Transaction call not allowed in the current unit-of-work state.
    TransactionState {
        operation: &'static str,
        state: session::TransactionState,
    },
    /// Flush aborted by the caller's cancel flag; staged writes dropped.
    Cancelled { discarded: usize },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::TransactionState { operation, state } => {
                write!(f, "`{operation}` is not allowed while {state}")
            }
            Self::Cancelled { discarded } => {
                write!(f, "flush cancelled; {discarded} staged writes discarded")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidArgument(_)
            | Self::InvalidData(_)
            | Self::TransactionState { .. }
            | Self::Cancelled { .. } => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a mutating repository operation.
///
/// `code()` maps each variant onto the integer sentinel used by sync
/// tooling: `-1` failure, `0` no-op or fresh insert, `1`/id applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Upsert staged a new row, or replaced a pending insert of the same
    /// natural key; a store-generated identity is assigned on flush.
    Inserted,
    /// Upsert matched an existing row by natural key and staged a replace.
    Updated(EntityId),
    /// Delete or enable/disable was staged.
    Applied,
    /// Target row does not exist.
    NotFound,
    /// Target row is already in the requested state.
    Unchanged,
    /// Input rejected before touching the store.
    Invalid(String),
    /// Store access failed; nothing was staged.
    Failed(String),
}

impl RepoOutcome {
    pub fn code(&self) -> i64 {
        match self {
            Self::Updated(id) => *id,
            Self::Applied => 1,
            Self::Inserted | Self::NotFound | Self::Unchanged => 0,
            Self::Invalid(_) | Self::Failed(_) => -1,
        }
    }

    /// Returns whether a write was staged.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated(_) | Self::Applied)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Failed(_))
    }
}

/// Generic CRUD contract implemented for every entity.
pub trait Repository<T> {
    /// Returns every row ordered by id; empty on store failure.
    fn get_all(&self) -> Vec<T>;
    /// `id <= 0` is not-found without a lookup.
    fn get_by_id(&self, id: EntityId) -> Option<T>;
    fn exists(&self, id: EntityId) -> bool;
    /// Natural-key upsert. On a match the candidate receives the existing id.
    fn upsert(&self, entity: &mut T) -> RepoOutcome;
    fn delete(&self, entity: &T) -> RepoOutcome;
}

//! Shared session behind the unit of work.
//!
//! # Responsibility
//! - Own the one connection every repository handle borrows.
//! - Buffer staged writes until a flush.
//! - Track the explicit-transaction state machine.
//!
//! # Invariants
//! - State moves `Idle -> InTransaction -> Idle` only; no nesting.
//! - A flush applies the whole staged batch or none of it.
//! - Each row has at most one pending insert; later writes to that row are
//!   folded into it.
//! - Dropping the session while `InTransaction` rolls the transaction back
//!   and discards staged writes.
//! - Single writer: the session is `!Sync` and must not be shared across
//!   threads.

use crate::repo::entity::{flag, int, timestamp, Entity};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

const FLUSH_SAVEPOINT: &str = "uow_flush";

/// Explicit-transaction state of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction,
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::InTransaction => f.write_str("in a transaction"),
        }
    }
}

/// Caller-owned cancellation signal checked between staged writes.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Insert,
    Update,
    Delete,
}

impl WriteKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Latest staged state of one row, as seen by lookups before a flush.
#[derive(Debug)]
pub(crate) enum StagedRow<T> {
    /// Row is queued for insert; a store-generated id is still `0`.
    Inserted(T),
    Updated(T),
    Deleted,
    /// No staged write touches the row; the store holds the truth.
    Untouched,
}

/// One buffered statement waiting for the next flush.
///
/// `image` is the row after the write (before it, for deletes) and backs
/// lookups that run before the flush.
#[derive(Debug)]
pub(crate) struct StagedWrite {
    entity: &'static str,
    table: &'static str,
    kind: WriteKind,
    key: String,
    sql: String,
    params: Vec<Value>,
    image: Box<dyn Any>,
}

impl StagedWrite {
    fn insert<T: Entity>(entity: &T) -> Self {
        let mut params = entity.column_values();
        let (columns, sql_params) = if T::GENERATED_ID {
            (T::COLUMNS.join(", "), placeholders(T::COLUMNS.len()))
        } else {
            params.insert(0, int(entity.id()));
            (
                format!("Id, {}", T::COLUMNS.join(", ")),
                placeholders(T::COLUMNS.len() + 1),
            )
        };
        Self {
            entity: T::KIND,
            table: T::TABLE,
            kind: WriteKind::Insert,
            key: entity.natural_key().to_string(),
            sql: format!("INSERT INTO {} ({columns}) VALUES ({sql_params});", T::TABLE),
            params,
            image: Box::new(entity.clone()),
        }
    }

    /// Full replace of every non-id column.
    fn update<T: Entity>(entity: &T) -> Self {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let mut params = entity.column_values();
        params.push(int(entity.id()));
        Self {
            entity: T::KIND,
            table: T::TABLE,
            kind: WriteKind::Update,
            key: entity.natural_key().to_string(),
            sql: format!(
                "UPDATE {} SET {assignments} WHERE Id = ?{};",
                T::TABLE,
                T::COLUMNS.len() + 1
            ),
            params,
            image: Box::new(entity.clone()),
        }
    }

    fn delete<T: Entity>(image: &T) -> Self {
        let id = image.id();
        Self {
            entity: T::KIND,
            table: T::TABLE,
            kind: WriteKind::Delete,
            key: format!("Id={id}"),
            sql: format!("DELETE FROM {} WHERE Id = ?1;", T::TABLE),
            params: vec![int(id)],
            image: Box::new(image.clone()),
        }
    }

    fn set_flag<T: Entity>(
        image: &T,
        column: &'static str,
        value: bool,
        at: DateTime<Utc>,
    ) -> Self {
        let id = image.id();
        Self {
            entity: T::KIND,
            table: T::TABLE,
            kind: WriteKind::Update,
            key: format!("Id={id}"),
            sql: format!(
                "UPDATE {} SET {column} = ?1, LastUpdated = ?2 WHERE Id = ?3;",
                T::TABLE
            ),
            params: vec![flag(value), timestamp(at), int(id)],
            image: Box::new(image.clone()),
        }
    }

    fn image_of<T: Entity>(&self) -> Option<&T> {
        if self.table != T::TABLE {
            return None;
        }
        self.image.downcast_ref::<T>()
    }
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Connection plus staged writes shared by every repository handle.
pub struct Session {
    conn: Connection,
    staged: RefCell<Vec<StagedWrite>>,
    state: Cell<TransactionState>,
}

impl Session {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn,
            staged: RefCell::new(Vec::new()),
            state: Cell::new(TransactionState::Idle),
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Resolves the newest staged write touching a row matched by `matches`.
    pub(crate) fn staged_row<T: Entity>(&self, matches: impl Fn(&T) -> bool) -> StagedRow<T> {
        for write in self.staged.borrow().iter().rev() {
            let Some(row) = write.image_of::<T>() else {
                continue;
            };
            if matches(row) {
                return match write.kind {
                    WriteKind::Insert => StagedRow::Inserted(row.clone()),
                    WriteKind::Update => StagedRow::Updated(row.clone()),
                    WriteKind::Delete => StagedRow::Deleted,
                };
            }
        }
        StagedRow::Untouched
    }

    /// Queues an insert, replacing a pending insert of the same natural key.
    pub(crate) fn stage_insert<T: Entity>(&self, entity: &T) {
        self.stage_row(entity, StagedWrite::insert(entity));
    }

    /// Queues a full replace; folds into a pending insert of the same row.
    pub(crate) fn stage_update<T: Entity>(&self, entity: &T) {
        self.stage_row(entity, StagedWrite::update(entity));
    }

    pub(crate) fn stage_flag<T: Entity>(
        &self,
        image: &T,
        column: &'static str,
        value: bool,
        at: DateTime<Utc>,
    ) {
        self.stage_row(image, StagedWrite::set_flag(image, column, value, at));
    }

    /// Queues a delete; a row that only exists as a pending insert is
    /// dropped from the queue instead.
    pub(crate) fn stage_delete<T: Entity>(&self, image: &T) {
        let mut staged = self.staged.borrow_mut();
        match pending_insert(&staged, image) {
            Some(index) => {
                staged.remove(index);
            }
            None => staged.push(StagedWrite::delete(image)),
        }
    }

    fn stage_row<T: Entity>(&self, image: &T, write: StagedWrite) {
        let mut staged = self.staged.borrow_mut();
        match pending_insert(&staged, image) {
            Some(index) => staged[index] = StagedWrite::insert(image),
            None => staged.push(write),
        }
    }

    pub fn staged_count(&self) -> usize {
        self.staged.borrow().len()
    }

    pub fn state(&self) -> TransactionState {
        self.state.get()
    }

    /// Drops every staged write and returns how many were dropped.
    pub(crate) fn discard(&self) -> usize {
        let dropped = self.staged.take().len();
        if dropped > 0 {
            warn!("event=uow_discard module=uow status=ok discarded={dropped}");
        }
        dropped
    }

    /// Applies the staged batch atomically and returns affected rows.
    ///
    /// While `Idle` the batch commits on success; while `InTransaction` it
    /// joins the open transaction. On failure the batch is rolled back and
    /// dropped.
    pub(crate) fn flush(&self, cancel: Option<&CancelFlag>) -> RepoResult<usize> {
        let batch = self.staged.take();
        if batch.is_empty() {
            return Ok(0);
        }

        let started_at = Instant::now();
        let state = self.state.get();
        self.conn.execute_batch(&format!("SAVEPOINT {FLUSH_SAVEPOINT};"))?;

        match run_writes(&self.conn, &batch, cancel) {
            Ok(affected) => {
                if let Err(err) = self.conn.execute_batch(&format!("RELEASE {FLUSH_SAVEPOINT};")) {
                    self.undo_flush();
                    error!(
                        "event=uow_complete module=uow status=error state={state:?} writes={} error_code=release_failed error={err}",
                        batch.len()
                    );
                    return Err(err.into());
                }
                info!(
                    "event=uow_complete module=uow status=ok state={state:?} writes={} affected={affected} duration_ms={}",
                    batch.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(affected)
            }
            Err(err) => {
                self.undo_flush();
                error!(
                    "event=uow_complete module=uow status=error state={state:?} writes={} duration_ms={} error={err}",
                    batch.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn undo_flush(&self) {
        if let Err(err) = self.conn.execute_batch(&format!(
            "ROLLBACK TO {FLUSH_SAVEPOINT}; RELEASE {FLUSH_SAVEPOINT};"
        )) {
            warn!("event=uow_complete module=uow status=error error_code=savepoint_rollback_failed error={err}");
        }
    }

    pub(crate) fn begin(&self) -> RepoResult<()> {
        self.require_state("begin_transaction", TransactionState::Idle)?;
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        self.state.set(TransactionState::InTransaction);
        info!("event=uow_begin module=uow status=ok");
        Ok(())
    }

    /// Flushes pending writes, then commits.
    ///
    /// A failed flush leaves the transaction open for the caller to roll
    /// back.
    pub(crate) fn commit(&self) -> RepoResult<usize> {
        self.require_state("commit_transaction", TransactionState::InTransaction)?;
        let affected = self.flush(None)?;
        self.conn.execute_batch("COMMIT;")?;
        self.state.set(TransactionState::Idle);
        info!("event=uow_commit module=uow status=ok affected={affected}");
        Ok(affected)
    }

    pub(crate) fn rollback(&self) -> RepoResult<()> {
        self.require_state("rollback_transaction", TransactionState::InTransaction)?;
        let discarded = self.staged.take().len();
        let result = self.conn.execute_batch("ROLLBACK;");
        self.state.set(TransactionState::Idle);
        result?;
        info!("event=uow_rollback module=uow status=ok discarded={discarded}");
        Ok(())
    }

    pub(crate) fn require_state(
        &self,
        operation: &'static str,
        expected: TransactionState,
    ) -> RepoResult<()> {
        let state = self.state.get();
        if state != expected {
            warn!("event=uow_state module=uow status=rejected operation={operation} state={state:?}");
            return Err(RepoError::TransactionState { operation, state });
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let discarded = self.staged.get_mut().len();
        if self.state.get() == TransactionState::InTransaction {
            if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
                warn!("event=uow_drop module=uow status=error error_code=rollback_failed error={err}");
            }
            warn!("event=uow_drop module=uow status=rolled_back discarded={discarded}");
        } else if discarded > 0 {
            warn!("event=uow_drop module=uow status=discarded discarded={discarded}");
        }
    }
}

/// Index of the newest write for `row` when that write is a pending insert.
fn pending_insert<T: Entity>(staged: &[StagedWrite], row: &T) -> Option<usize> {
    let key = row.natural_key();
    for (index, write) in staged.iter().enumerate().rev() {
        if write.image_of::<T>().is_some_and(|image| image.natural_key() == key) {
            return (write.kind == WriteKind::Insert).then_some(index);
        }
    }
    None
}

fn run_writes(
    conn: &Connection,
    batch: &[StagedWrite],
    cancel: Option<&CancelFlag>,
) -> RepoResult<usize> {
    let mut affected = 0;
    for write in batch {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(RepoError::Cancelled {
                discarded: batch.len(),
            });
        }
        match conn.execute(&write.sql, params_from_iter(write.params.iter())) {
            Ok(changed) => affected += changed,
            Err(err) => {
                error!(
                    "event=uow_write module=uow status=error entity={} op={} key={} error={err}",
                    write.entity,
                    write.kind.as_str(),
                    write.key
                );
                return Err(err.into());
            }
        }
    }
    Ok(affected)
}

//! Generic SQLite repository over any mapped entity.
//!
//! # Responsibility
//! - Implement the `Repository<T>` contract once for every `Entity`.
//! - Own the natural-key upsert and the enable/disable toggle.
//!
//! # Invariants
//! - Upsert looks rows up by natural key, never by the incoming id.
//! - Point lookups resolve the session's staged writes before the store;
//!   listings read flushed rows only.
//! - A matched upsert replaces every non-id column (no null-skipping merge).
//! - Failures are logged with entity kind and key, then folded into the
//!   operation's sentinel result.

use crate::model::EntityId;
use crate::repo::entity::{select_sql, Entity, NaturalKey};
use crate::repo::session::{Session, StagedRow};
use crate::repo::{RepoOutcome, RepoResult, Repository};
use chrono::Utc;
use log::{error, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension};
use std::marker::PhantomData;

/// Repository handle borrowing the unit-of-work session.
pub struct SqliteRepository<'s, T> {
    session: &'s Session,
    _entity: PhantomData<T>,
}

impl<'s, T: Entity> SqliteRepository<'s, T> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    /// Looks up the row sharing `candidate`'s natural key, staged writes
    /// first. A row only staged for insert may still carry id `0`.
    pub fn find_by_natural_key(&self, candidate: &T) -> RepoResult<Option<T>> {
        let key = candidate.natural_key();
        match self.session.staged_row(|row: &T| row.natural_key() == key) {
            StagedRow::Inserted(row) | StagedRow::Updated(row) => return Ok(Some(row)),
            StagedRow::Deleted => return Ok(None),
            StagedRow::Untouched => {}
        }
        self.query_natural_key(&key)
    }

    /// Lists rows where `column = value`, ordered by id. Empty on failure.
    pub(crate) fn list_where(&self, column: &'static str, value: Value) -> Vec<T> {
        let sql = format!("{} WHERE {column} = ?1 ORDER BY Id ASC;", select_sql::<T>());
        match self.query_all(&sql, &[value]) {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    "event=repo_list module=repo status=error entity={} filter={column} error={err}",
                    T::KIND
                );
                Vec::new()
            }
        }
    }

    /// Stages `column = enabled` for row `id` unless it already holds it.
    pub(crate) fn set_enabled(
        &self,
        id: EntityId,
        column: &'static str,
        enabled: bool,
        field: fn(&mut T) -> &mut bool,
    ) -> RepoOutcome {
        let event = if enabled { "repo_enable" } else { "repo_disable" };
        if id <= 0 {
            warn!(
                "event={event} module=repo status=rejected entity={} id={id}",
                T::KIND
            );
            return RepoOutcome::Invalid(format!("{} id must be positive, got {id}", T::KIND));
        }

        let mut row = match self.load_by_id(id) {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                warn!(
                    "event={event} module=repo status=not_found entity={} id={id}",
                    T::KIND
                );
                return RepoOutcome::NotFound;
            }
            Err(err) => {
                error!(
                    "event={event} module=repo status=error entity={} id={id} error={err}",
                    T::KIND
                );
                return RepoOutcome::Failed(err.to_string());
            }
        };

        let slot = field(&mut row);
        if *slot == enabled {
            return RepoOutcome::Unchanged;
        }
        *slot = enabled;

        let at = Utc::now();
        row.set_last_updated(at);
        self.session.stage_flag(&row, column, enabled, at);
        RepoOutcome::Applied
    }

    fn load_by_id(&self, id: EntityId) -> RepoResult<Option<T>> {
        match self.session.staged_row(|row: &T| row.id() == id) {
            StagedRow::Inserted(row) | StagedRow::Updated(row) => return Ok(Some(row)),
            StagedRow::Deleted => return Ok(None),
            StagedRow::Untouched => {}
        }
        let sql = format!("{} WHERE Id = ?1;", select_sql::<T>());
        self.query_optional(&sql, &[Value::Integer(id)])
    }

    fn query_natural_key(&self, key: &NaturalKey) -> RepoResult<Option<T>> {
        let sql = format!("{} WHERE {} LIMIT 1;", select_sql::<T>(), key.where_clause());
        self.query_optional(&sql, key.values())
    }

    fn query_optional(&self, sql: &str, params: &[Value]) -> RepoResult<Option<T>> {
        let mut stmt = self.session.conn().prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(T::from_row(row)?));
        }
        Ok(None)
    }

    fn query_all(&self, sql: &str, params: &[Value]) -> RepoResult<Vec<T>> {
        let mut stmt = self.session.conn().prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(T::from_row(row)?);
        }
        Ok(items)
    }

    fn id_exists(&self, id: EntityId) -> RepoResult<bool> {
        match self.session.staged_row(|row: &T| row.id() == id) {
            StagedRow::Inserted(_) | StagedRow::Updated(_) => return Ok(true),
            StagedRow::Deleted => return Ok(false),
            StagedRow::Untouched => {}
        }
        let found = self
            .session
            .conn()
            .query_row(
                &format!("SELECT 1 FROM {} WHERE Id = ?1;", T::TABLE),
                [id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl<T: Entity> Repository<T> for SqliteRepository<'_, T> {
    fn get_all(&self) -> Vec<T> {
        let sql = format!("{} ORDER BY Id ASC;", select_sql::<T>());
        match self.query_all(&sql, &[]) {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    "event=repo_get_all module=repo status=error entity={} error={err}",
                    T::KIND
                );
                Vec::new()
            }
        }
    }

    fn get_by_id(&self, id: EntityId) -> Option<T> {
        if id <= 0 {
            warn!(
                "event=repo_get module=repo status=rejected entity={} id={id}",
                T::KIND
            );
            return None;
        }
        match self.load_by_id(id) {
            Ok(found) => found,
            Err(err) => {
                error!(
                    "event=repo_get module=repo status=error entity={} id={id} error={err}",
                    T::KIND
                );
                None
            }
        }
    }

    fn exists(&self, id: EntityId) -> bool {
        if id <= 0 {
            warn!(
                "event=repo_exists module=repo status=rejected entity={} id={id}",
                T::KIND
            );
            return false;
        }
        self.id_exists(id).unwrap_or_else(|err| {
            error!(
                "event=repo_exists module=repo status=error entity={} id={id} error={err}",
                T::KIND
            );
            false
        })
    }

    fn upsert(&self, entity: &mut T) -> RepoOutcome {
        let key = entity.natural_key();
        if let Err(err) = entity.validate() {
            warn!(
                "event=repo_upsert module=repo status=rejected entity={} key={key} error={err}",
                T::KIND
            );
            return RepoOutcome::Invalid(err.to_string());
        }

        // A pending insert of the same key is replaced in place.
        let existing_id = match self.session.staged_row(|row: &T| row.natural_key() == key) {
            StagedRow::Inserted(_) | StagedRow::Deleted => None,
            StagedRow::Updated(row) => Some(row.id()),
            StagedRow::Untouched => match self.query_natural_key(&key) {
                Ok(existing) => existing.map(|row| row.id()),
                Err(err) => {
                    error!(
                        "event=repo_upsert module=repo status=error entity={} key={key} error={err}",
                        T::KIND
                    );
                    return RepoOutcome::Failed(err.to_string());
                }
            },
        };

        entity.set_last_updated(Utc::now());
        match existing_id {
            Some(id) => {
                entity.set_id(id);
                self.session.stage_update(&*entity);
                RepoOutcome::Updated(id)
            }
            None => {
                if T::GENERATED_ID {
                    entity.set_id(0);
                }
                self.session.stage_insert(&*entity);
                RepoOutcome::Inserted
            }
        }
    }

    fn delete(&self, entity: &T) -> RepoOutcome {
        let id = entity.id();
        if id <= 0 {
            warn!(
                "event=repo_delete module=repo status=rejected entity={} id={id}",
                T::KIND
            );
            return RepoOutcome::Invalid(format!("{} id must be positive, got {id}", T::KIND));
        }

        match self.load_by_id(id) {
            Ok(Some(existing)) => {
                self.session.stage_delete(&existing);
                RepoOutcome::Applied
            }
            Ok(None) => {
                warn!(
                    "event=repo_delete module=repo status=not_found entity={} id={id}",
                    T::KIND
                );
                RepoOutcome::NotFound
            }
            Err(err) => {
                error!(
                    "event=repo_delete module=repo status=error entity={} id={id} error={err}",
                    T::KIND
                );
                RepoOutcome::Failed(err.to_string())
            }
        }
    }
}

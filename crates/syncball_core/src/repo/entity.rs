//! Table mapping shared by the generic repository.
//!
//! # Responsibility
//! - Describe how one entity maps onto one table: name, ordered columns,
//!   identity policy and natural key.
//! - Encode/decode column values with strict checks on persisted data.
//!
//! # Invariants
//! - `Entity::COLUMNS` excludes `Id` and matches `column_values()` order.
//! - Timestamps are stored as RFC 3339 text with nanosecond precision.

use crate::model::{EntityId, ModelValidationError};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use std::fmt::{Display, Formatter};

/// Persistence mapping for one entity table.
pub trait Entity: Sized + Clone + 'static {
    /// Short label used in log events, e.g. `country`.
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Every persisted column except `Id`, in bind order.
    const COLUMNS: &'static [&'static str];
    /// `true` when the store assigns `Id`; `false` when the feed does.
    const GENERATED_ID: bool;

    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn set_last_updated(&mut self, at: DateTime<Utc>);
    /// Columns identifying the row independently of the surrogate id.
    fn natural_key(&self) -> NaturalKey;
    fn column_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
    fn validate(&self) -> Result<(), ModelValidationError>;
}

/// Natural key of one candidate row.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalKey {
    columns: &'static [&'static str],
    values: Vec<Value>,
}

impl NaturalKey {
    pub fn new(columns: &'static [&'static str], values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn where_clause(&self) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

impl Display for NaturalKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, (column, value)) in self.columns.iter().zip(&self.values).enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            match value {
                Value::Null => write!(f, "{column}=null")?,
                Value::Integer(v) => write!(f, "{column}={v}")?,
                Value::Real(v) => write!(f, "{column}={v}")?,
                Value::Text(v) => write!(f, "{column}={v}")?,
                Value::Blob(_) => write!(f, "{column}=<blob>")?,
            }
        }
        Ok(())
    }
}

pub(crate) fn select_sql<T: Entity>() -> String {
    format!("SELECT Id, {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

pub(crate) fn int(value: i64) -> Value {
    Value::Integer(value)
}

pub(crate) fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub(crate) fn timestamp(value: DateTime<Utc>) -> Value {
    Value::Text(value.to_rfc3339_opts(SecondsFormat::Nanos, false))
}

pub(crate) fn read_flag(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn read_timestamp(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{raw}` in {table}.{column}"))
        })
}

#[cfg(test)]
mod tests {
    use super::{int, text, timestamp, NaturalKey};
    use chrono::{DateTime, TimeZone, Utc};
    use rusqlite::types::Value;

    #[test]
    fn natural_key_renders_where_clause_and_log_label() {
        let key = NaturalKey::new(&["LeagueId", "Year"], vec![int(39), text("2024")]);
        assert_eq!(key.where_clause(), "LeagueId = ?1 AND Year = ?2");
        assert_eq!(key.to_string(), "LeagueId=39,Year=2024");
    }

    #[test]
    fn timestamp_text_keeps_nanoseconds() {
        let at = Utc
            .with_ymd_and_hms(2025, 5, 17, 11, 10, 31)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
            .unwrap();
        let Value::Text(raw) = timestamp(at) else {
            panic!("timestamp must encode as text");
        };
        let parsed = DateTime::parse_from_rfc3339(&raw).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), at);
    }
}

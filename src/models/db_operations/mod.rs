use crate::models::{MediaType, MemberStatus};
use crate::DbPool;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Error as RusqliteError;
use std::path::Path;
use std::time::Duration;

pub mod admin_users_db_operations;
pub mod contacts_db_operations;
pub mod media_db_operations;
pub mod members_db_operations;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection pool on the site database file.
pub fn open_pool(db_path: &Path) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
    r2d2::Pool::builder().build(manager)
}

/// Timestamps are stored as fixed-width RFC 3339 text so that ordering by the
/// column is chronological.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(column: usize, raw: &str) -> Result<DateTime<Utc>, RusqliteError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RusqliteError::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// True when the statement failed on a UNIQUE constraint.
pub fn is_unique_violation(err: &RusqliteError) -> bool {
    matches!(
        err,
        RusqliteError::SqliteFailure(inner, _) if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl ToSql for MemberStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MemberStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for MediaType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MediaType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_timestamps_sort_chronologically() {
        let earlier = DateTime::parse_from_rfc3339("2024-03-09T08:00:00Z").unwrap().with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2024-03-10T07:59:59.5Z").unwrap().with_timezone(&Utc);
        assert!(encode_timestamp(&earlier) < encode_timestamp(&later));
        assert_eq!(decode_timestamp(0, &encode_timestamp(&later)).unwrap(), later);
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;

/// Errors raised by the storage layer and the lifecycle reset path.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// An insert referenced a category that does not exist, used a category of
    /// the other kind, or reused a category name.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A delete or lookup targeted a row that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The database or flag file could not be opened, read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A value was rejected before it reached storage (negative amount, blank name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// SQLite errors not covered by the variants above.
    #[error("sqlite error: {0}")]
    Sql(rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<rusqlite::Error> for LedgerError {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, desc) = &error {
            let detail = desc.clone().unwrap_or_else(|| e.to_string());
            match e.code {
                ErrorCode::ConstraintViolation => {
                    return LedgerError::ConstraintViolation(detail);
                }
                ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::DiskFull
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase => return LedgerError::StorageUnavailable(detail),
                _ => {}
            }
        }
        match error {
            rusqlite::Error::QueryReturnedNoRows => {
                LedgerError::NotFound("query returned no rows".into())
            }
            e => LedgerError::Sql(e),
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::StorageUnavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_failure_maps_to_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t(name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: LedgerError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, LedgerError::ConstraintViolation(_)), "{err:?}");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        let err: LedgerError = conn
            .query_row("SELECT 1 WHERE 0", [], |r| r.get::<_, i64>(0))
            .unwrap_err()
            .into();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}

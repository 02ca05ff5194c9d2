//! Crate-wide error taxonomy.
//!
//! # Responsibility
//! - Classify every failure a notification operation can report.
//! - Keep local validation failures distinguishable from store/transport ones.
//!
//! # Invariants
//! - `InvalidParameter` is produced before any I/O is attempted.
//! - Store failures are carried verbatim inside `FromDb`.
//! - `ServiceNotReady` is never folded into `Io`.

use crate::db::DbError;
use crate::model::noti::PrivId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotiResult<T> = Result<T, NotiError>;

/// Error returned by record, codec, store and client operations.
#[derive(Debug)]
pub enum NotiError {
    /// Bad or missing argument, rejected locally.
    InvalidParameter(String),
    /// Allocation failure reported by a collaborator.
    OutOfMemory,
    /// SQLite prepare/step failure or constraint violation.
    FromDb(DbError),
    /// Insert collided with an existing id.
    AlreadyExistsId(PrivId),
    /// Update/lookup target is missing.
    NotExistId(PrivId),
    /// Remote call could not be delivered.
    Io(String),
    /// Remote service is absent.
    ServiceNotReady,
    /// Remote side rejected the caller.
    PermissionDenied,
    /// Persisted or wire data cannot be converted into a record.
    InvalidData(String),
}

impl NotiError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::OutOfMemory => "out_of_memory",
            Self::FromDb(_) => "from_db",
            Self::AlreadyExistsId(_) => "already_exists_id",
            Self::NotExistId(_) => "not_exist_id",
            Self::Io(_) => "io_error",
            Self::ServiceNotReady => "service_not_ready",
            Self::PermissionDenied => "permission_denied",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for NotiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::FromDb(err) => write!(f, "{err}"),
            Self::AlreadyExistsId(id) => write!(f, "notification id already exists: {id}"),
            Self::NotExistId(id) => write!(f, "notification id does not exist: {id}"),
            Self::Io(message) => write!(f, "service call failed: {message}"),
            Self::ServiceNotReady => write!(f, "notification service is not ready"),
            Self::PermissionDenied => write!(f, "permission denied by notification service"),
            Self::InvalidData(message) => write!(f, "invalid notification data: {message}"),
        }
    }
}

impl Error for NotiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FromDb(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for NotiError {
    fn from(value: DbError) -> Self {
        Self::FromDb(value)
    }
}

impl From<rusqlite::Error> for NotiError {
    fn from(value: rusqlite::Error) -> Self {
        Self::FromDb(DbError::Sqlite(value))
    }
}

#[cfg(test)]
mod tests {
    use super::NotiError;

    #[test]
    fn sqlite_errors_map_to_from_db() {
        let err: NotiError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.code(), "from_db");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn service_not_ready_is_distinct_from_io() {
        assert_ne!(
            NotiError::ServiceNotReady.code(),
            NotiError::Io("x".to_string()).code()
        );
    }
}

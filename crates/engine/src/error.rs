//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] malformed input, attributed to the offending field.
//! - [`InsufficientBalance`] a debit larger than the domain balance.
//! - [`NotFound`] a reference to an unknown category or domain.
//! - [`ConcurrencyConflict`] the write could not be serialized against a
//!   competing writer; the caller should retry the whole operation.
//! - [`Storage`] any database fault. Nothing is committed when it occurs.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`NotFound`]: EngineError::NotFound
//!  [`ConcurrencyConflict`]: EngineError::ConcurrencyConflict
//!  [`Storage`]: EngineError::Storage
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Money, available: Money },
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Concurrent write conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Storage(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        Self::from_storage(err)
    }
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// A sum of amounts left the representable range of [`Money`].
    pub(crate) fn overflow() -> Self {
        Self::validation("amount", "amount would overflow the domain balance")
    }

    /// The input field the error should be rendered next to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::InsufficientBalance { .. } => Some("amount"),
            _ => None,
        }
    }

    /// Maps a unique-index violation or a busy database to
    /// [`EngineError::ConcurrencyConflict`].
    ///
    /// Unique keys (transaction numbers, category names) are computed inside
    /// the write, so a violation means a competing writer got there first.
    pub(crate) fn from_write(err: DbErr, what: &str) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Self::ConcurrencyConflict(format!("{what} was written concurrently"));
        }
        Self::from_storage(err)
    }

    /// Maps SQLite `SQLITE_BUSY`/`SQLITE_LOCKED` (another process holds the
    /// write lock) to [`EngineError::ConcurrencyConflict`], anything else to
    /// [`EngineError::Storage`].
    pub(crate) fn from_storage(err: DbErr) -> Self {
        if is_busy(&err) {
            return Self::ConcurrencyConflict("database is locked by another writer".to_string());
        }
        Self::Storage(err)
    }
}

fn is_busy(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("database is locked")
        || message.contains("database is busy")
        || message.contains("database table is locked")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation {
                    field: fa,
                    message: ma,
                },
                Self::Validation {
                    field: fb,
                    message: mb,
                },
            ) => fa == fb && ma == mb,
            (
                Self::InsufficientBalance {
                    requested: ra,
                    available: aa,
                },
                Self::InsufficientBalance {
                    requested: rb,
                    available: ab,
                },
            ) => ra == rb && aa == ab,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ConcurrencyConflict(a), Self::ConcurrencyConflict(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_attribution() {
        assert_eq!(
            EngineError::validation("date_to", "before date_from").field(),
            Some("date_to")
        );
        let err = EngineError::InsufficientBalance {
            requested: Money::new(701),
            available: Money::new(700),
        };
        assert_eq!(err.field(), Some("amount"));
        assert_eq!(EngineError::NotFound("category 3".to_string()).field(), None);
    }

    #[test]
    fn busy_database_is_a_conflict() {
        let err = EngineError::from_write(
            DbErr::Custom("error returned from database: (code: 5) database is locked".into()),
            "ledger record",
        );
        assert!(matches!(err, EngineError::ConcurrencyConflict(_)));

        let err = EngineError::from(DbErr::Custom("database table is locked".into()));
        assert!(matches!(err, EngineError::ConcurrencyConflict(_)));

        let err = EngineError::from_write(DbErr::Custom("disk I/O error".into()), "ledger record");
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[test]
    fn overflow_is_attributed_to_amount() {
        assert_eq!(EngineError::overflow().field(), Some("amount"));
    }

    #[test]
    fn insufficient_balance_message() {
        let err = EngineError::InsufficientBalance {
            requested: Money::new(70_100),
            available: Money::new(70_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 701.00, available 700.00"
        );
    }
}

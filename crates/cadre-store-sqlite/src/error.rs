//! Error classification for the SQLite backend.
//!
//! This crate defines no error type of its own: trait methods return the
//! core taxonomy directly, so the API layer can map variants to status codes
//! without knowing which backend produced them. What lives here is the
//! translation from SQLite failures into that taxonomy.

use std::fmt;

pub use cadre_core::{Error, Result};

/// Error union carried through a [`tokio_rusqlite`] call closure: either a
/// domain error that must survive untouched, or a SQLite error awaiting
/// classification.
#[derive(Debug)]
pub(crate) enum CallError {
  Domain(Error),
  Sql(rusqlite::Error),
}

impl fmt::Display for CallError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CallError::Domain(e) => e.fmt(f),
      CallError::Sql(e) => e.fmt(f),
    }
  }
}

impl std::error::Error for CallError {}

impl From<Error> for CallError {
  fn from(e: Error) -> Self {
    CallError::Domain(e)
  }
}

impl From<rusqlite::Error> for CallError {
  fn from(e: rusqlite::Error) -> Self {
    CallError::Sql(e)
  }
}

pub(crate) type CallResult<T> = std::result::Result<T, CallError>;

/// Map a raw SQLite failure into the core taxonomy. Constraint violations
/// (a UNIQUE/CHECK/FK race the app-level pre-checks did not catch) become a
/// generic conflict; everything else is a backend failure.
pub(crate) fn classify_sqlite(e: rusqlite::Error) -> Error {
  match &e {
    rusqlite::Error::SqliteFailure(failure, message)
      if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Error::Constraint(message.clone().unwrap_or_else(|| e.to_string()))
    }
    _ => Error::Store(e.to_string()),
  }
}

/// Unwrap the error a call closure produced back out of
/// [`tokio_rusqlite::Error::Other`] and classify it.
pub(crate) fn classify_call(e: tokio_rusqlite::Error) -> Error {
  match e {
    tokio_rusqlite::Error::Other(boxed) => {
      match boxed.downcast::<CallError>() {
        Ok(call) => match *call {
          CallError::Domain(domain) => domain,
          CallError::Sql(sql) => classify_sqlite(sql),
        },
        Err(other) => Error::Store(other.to_string()),
      }
    }
    tokio_rusqlite::Error::Rusqlite(sql) => classify_sqlite(sql),
    other => Error::Store(other.to_string()),
  }
}

//! [`SqliteStore`] — the SQLite implementation of the registry store traits.
//!
//! One trait impl per submodule; this module owns the connection, the call
//! plumbing that carries domain errors across the connection thread, and the
//! existence/dependent/duplicate helpers every impl shares.

mod activities;
mod catalog;
mod courses;
mod letters;
mod links;
mod people;
mod projects;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use cadre_core::{error::EntityKind, letter::LetterParent, temporal, Error};

use crate::{
  encode::encode_dt,
  error::{classify_call, CallResult},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A cadre registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(classify_call)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(classify_call)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(classify_call)
  }

  /// Run `f` on the connection thread. Domain errors raised inside the
  /// closure come back verbatim; SQLite errors are classified into the core
  /// taxonomy. Multi-statement closures open a rusqlite transaction, and an
  /// early `?` return drops it, rolling the whole operation back.
  pub(crate) async fn call<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> CallResult<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        f(conn).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
      })
      .await
      .map_err(classify_call)
  }
}

// ─── Shared query helpers ────────────────────────────────────────────────────

pub(crate) type SqlParams = Vec<Box<dyn rusqlite::ToSql + Send>>;

/// True iff `sql` (a `SELECT 1 … LIMIT 1`-style probe) returns a row.
pub(crate) fn exists_row<P: rusqlite::Params>(
  conn: &rusqlite::Connection,
  sql: &str,
  params: P,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, params, |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Fail with `NotFound` unless `table` has a row with this id.
pub(crate) fn require_id(
  conn: &rusqlite::Connection,
  table: &str,
  kind: EntityKind,
  id: i64,
) -> CallResult<()> {
  let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
  if exists_row(conn, &sql, [id])? {
    Ok(())
  } else {
    Err(Error::not_found(kind, id).into())
  }
}

/// Referential Guard: run every dependent probe (each a `SELECT 1` keyed on
/// `?1` = the parent id) and fail the whole delete on the first non-empty
/// collection. Partial deletion is never attempted.
pub(crate) fn guard_dependents(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  id: i64,
  probes: &[(&'static str, &str)],
) -> CallResult<()> {
  for (label, sql) in probes {
    if exists_row(conn, sql, [id])? {
      return Err(Error::has_dependents(kind, id, label).into());
    }
  }
  Ok(())
}

/// Per-kind existence dispatch for a decision letter's polymorphic parent.
pub(crate) fn require_letter_parent(
  conn: &rusqlite::Connection,
  parent: LetterParent,
) -> CallResult<()> {
  let table = match parent {
    LetterParent::PersonRole(_) => "person_roles",
    LetterParent::Project(_) => "projects",
    LetterParent::Course(_) => "courses",
  };
  require_id(conn, table, parent.entity_kind(), parent.id())
}

/// Dynamic WHERE-clause builder: conditions AND together, each binding its
/// positional parameters in push order.
pub(crate) struct Filters {
  conds:  Vec<String>,
  params: SqlParams,
}

impl Filters {
  pub fn new() -> Self {
    Self {
      conds:  Vec::new(),
      params: Vec::new(),
    }
  }

  pub fn push(
    &mut self,
    cond: impl Into<String>,
    param: impl rusqlite::ToSql + Send + 'static,
  ) {
    self.conds.push(cond.into());
    self.params.push(Box::new(param));
  }

  /// Case-insensitive substring search, ORed across `cols`.
  pub fn search(&mut self, cols: &[&str], needle: &str) {
    let pattern = format!("%{needle}%");
    let ors = cols
      .iter()
      .map(|c| format!("{c} LIKE ?"))
      .collect::<Vec<_>>()
      .join(" OR ");
    self.conds.push(format!("({ors})"));
    for _ in cols {
      self.params.push(Box::new(pattern.clone()));
    }
  }

  /// Derived-status predicate over a nullable end-date column, the SQL twin
  /// of [`temporal::is_active_at`].
  pub fn active(&mut self, col: &str, active: bool, now: DateTime<Utc>) {
    let today = encode_dt(temporal::start_of_day(now));
    if active {
      self.push(format!("({col} IS NULL OR {col} >= ?)"), today);
    } else {
      self.push(format!("({col} IS NOT NULL AND {col} < ?)"), today);
    }
  }

  /// `"WHERE …"`, or an empty string when no filter was pushed.
  pub fn clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  pub fn into_params(self) -> SqlParams {
    self.params
  }
}

//! [`LetterStore`] impl.
//!
//! The polymorphic parent has no foreign key behind it, so every operation
//! resolves the (kind, id) pair explicitly: creates verify the parent row
//! exists, listings filter on both columns together.

use rusqlite::OptionalExtension as _;

use cadre_core::{
  error::EntityKind,
  letter::{DecisionLetter, LetterParent},
  store::LetterStore,
  Error,
};

use super::{require_letter_parent, SqliteStore};
use crate::{encode::RawLetter, error::Result};

fn raw_letter(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLetter> {
  Ok(RawLetter {
    id:          row.get(0)?,
    parent_kind: row.get(1)?,
    parent_id:   row.get(2)?,
    link:        row.get(3)?,
  })
}

impl LetterStore for SqliteStore {
  async fn add_letter(
    &self,
    parent: LetterParent,
    link: String,
  ) -> Result<DecisionLetter> {
    self
      .call(move |conn| {
        require_letter_parent(conn, parent)?;
        conn.execute(
          "INSERT INTO decision_letters (parent_kind, parent_id, link) \
           VALUES (?1, ?2, ?3)",
          rusqlite::params![parent.discriminant(), parent.id(), link],
        )?;
        Ok(DecisionLetter {
          id: conn.last_insert_rowid(),
          parent,
          link,
        })
      })
      .await
  }

  async fn get_letter(&self, id: i64) -> Result<Option<DecisionLetter>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT id, parent_kind, parent_id, link \
             FROM decision_letters WHERE id = ?1",
            rusqlite::params![id],
            raw_letter,
          )
          .optional()?;
        Ok(raw.map(RawLetter::into_letter).transpose()?)
      })
      .await
  }

  async fn list_letters(&self, parent: LetterParent) -> Result<Vec<DecisionLetter>> {
    self
      .call(move |conn| {
        require_letter_parent(conn, parent)?;
        let mut stmt = conn.prepare(
          "SELECT id, parent_kind, parent_id, link FROM decision_letters \
           WHERE parent_kind = ?1 AND parent_id = ?2 ORDER BY id",
        )?;
        let raws = stmt
          .query_map(
            rusqlite::params![parent.discriminant(), parent.id()],
            raw_letter,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawLetter::into_letter)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_letter(&self, id: i64, link: String) -> Result<DecisionLetter> {
    self
      .call(move |conn| {
        let letter = conn
          .query_row(
            "SELECT id, parent_kind, parent_id, link \
             FROM decision_letters WHERE id = ?1",
            rusqlite::params![id],
            raw_letter,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::DecisionLetter, id))?
          .into_letter()?;

        conn.execute(
          "UPDATE decision_letters SET link = ?1 WHERE id = ?2",
          rusqlite::params![link, id],
        )?;
        Ok(DecisionLetter { link, ..letter })
      })
      .await
  }

  async fn delete_letter(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM decision_letters WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if deleted == 0 {
          return Err(Error::not_found(EntityKind::DecisionLetter, id).into());
        }
        Ok(())
      })
      .await
  }
}

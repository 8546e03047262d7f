//! [`CatalogStore`] impl: the flat `{id, name}` lookups plus fields.

use rusqlite::OptionalExtension as _;

use cadre_core::{
  catalog::{Field, FieldPatch, Lookup, LookupKind, NewField},
  error::EntityKind,
  query::{FieldFilter, LookupFilter},
  store::CatalogStore,
  Error,
};

use super::{exists_row, guard_dependents, require_id, Filters, SqliteStore};
use crate::error::{CallResult, Result};

fn table(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Institution => "institutions",
    LookupKind::ResearcherTitle => "researcher_titles",
    LookupKind::Branch => "branches",
    LookupKind::ProjectCallType => "project_call_types",
    LookupKind::GradSchoolActivityType => "grad_school_activity_types",
  }
}

/// Dependent probes per lookup kind, `?1` = the lookup id.
fn dependent_probes(kind: LookupKind) -> &'static [(&'static str, &'static str)] {
  match kind {
    LookupKind::Institution => &[
      ("affiliations", "SELECT 1 FROM affiliations WHERE institution_id = ?1 LIMIT 1"),
      ("course links", "SELECT 1 FROM course_institutions WHERE institution_id = ?1 LIMIT 1"),
      ("postdoc records", "SELECT 1 FROM postdocs WHERE current_institution_id = ?1 LIMIT 1"),
    ],
    LookupKind::ResearcherTitle => &[
      (
        "researcher records",
        "SELECT 1 FROM researchers WHERE title_id = ?1 OR original_title_id = ?1 LIMIT 1",
      ),
      ("postdoc records", "SELECT 1 FROM postdocs WHERE current_title_id = ?1 LIMIT 1"),
    ],
    LookupKind::Branch => {
      &[("fields", "SELECT 1 FROM fields WHERE branch_id = ?1 LIMIT 1")]
    }
    LookupKind::ProjectCallType => {
      &[("projects", "SELECT 1 FROM projects WHERE call_type_id = ?1 LIMIT 1")]
    }
    LookupKind::GradSchoolActivityType => &[(
      "grad school activities",
      "SELECT 1 FROM grad_school_activities WHERE activity_type_id = ?1 LIMIT 1",
    )],
  }
}

/// Duplicate pre-check on the name column, optionally excluding one row
/// (for renames). The UNIQUE constraint is the actual guarantee.
fn check_name_free(
  conn: &rusqlite::Connection,
  table: &str,
  kind: EntityKind,
  name: &str,
  exclude_id: Option<i64>,
) -> CallResult<()> {
  let taken = match exclude_id {
    Some(id) => exists_row(
      conn,
      &format!("SELECT 1 FROM {table} WHERE name = ?1 AND id != ?2"),
      rusqlite::params![name, id],
    )?,
    None => exists_row(
      conn,
      &format!("SELECT 1 FROM {table} WHERE name = ?1"),
      rusqlite::params![name],
    )?,
  };
  if taken {
    Err(Error::duplicate(format!("{kind} {name:?} already exists")).into())
  } else {
    Ok(())
  }
}

impl CatalogStore for SqliteStore {
  async fn create_lookup(&self, kind: LookupKind, name: String) -> Result<Lookup> {
    self
      .call(move |conn| {
        let table = table(kind);
        check_name_free(conn, table, kind.entity_kind(), &name, None)?;
        conn.execute(
          &format!("INSERT INTO {table} (name) VALUES (?1)"),
          rusqlite::params![name],
        )?;
        Ok(Lookup {
          id: conn.last_insert_rowid(),
          name,
        })
      })
      .await
  }

  async fn get_lookup(&self, kind: LookupKind, id: i64) -> Result<Option<Lookup>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT id, name FROM {} WHERE id = ?1", table(kind)),
              rusqlite::params![id],
              |row| {
                Ok(Lookup {
                  id:   row.get(0)?,
                  name: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_lookups(
    &self,
    kind: LookupKind,
    filter: LookupFilter,
  ) -> Result<Vec<Lookup>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        let mut limit = "";
        if let Some(name) = filter.name {
          // Exact-match duplicate-prevention lookup: at most one row.
          filters.push("name = ?", name);
          limit = "LIMIT 1";
        } else if let Some(search) = filter.search.as_deref() {
          filters.search(&["name"], search);
        }
        let sql = format!(
          "SELECT id, name FROM {} {} ORDER BY name {limit}",
          table(kind),
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(filters.into_params()), |row| {
            Ok(Lookup {
              id:   row.get(0)?,
              name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_lookup(
    &self,
    kind: LookupKind,
    id: i64,
    name: String,
  ) -> Result<Lookup> {
    self
      .call(move |conn| {
        let table = table(kind);
        require_id(conn, table, kind.entity_kind(), id)?;
        check_name_free(conn, table, kind.entity_kind(), &name, Some(id))?;
        conn.execute(
          &format!("UPDATE {table} SET name = ?1 WHERE id = ?2"),
          rusqlite::params![name, id],
        )?;
        Ok(Lookup { id, name })
      })
      .await
  }

  async fn delete_lookup(&self, kind: LookupKind, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        let table = table(kind);
        require_id(conn, table, kind.entity_kind(), id)?;
        guard_dependents(conn, kind.entity_kind(), id, dependent_probes(kind))?;
        conn.execute(
          &format!("DELETE FROM {table} WHERE id = ?1"),
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  async fn create_field(&self, input: NewField) -> Result<Field> {
    self
      .call(move |conn| {
        require_id(conn, "branches", EntityKind::Branch, input.branch_id)?;
        check_name_free(conn, "fields", EntityKind::Field, &input.name, None)?;
        conn.execute(
          "INSERT INTO fields (name, branch_id) VALUES (?1, ?2)",
          rusqlite::params![input.name, input.branch_id],
        )?;
        Ok(Field {
          id:        conn.last_insert_rowid(),
          name:      input.name,
          branch_id: input.branch_id,
        })
      })
      .await
  }

  async fn get_field(&self, id: i64) -> Result<Option<Field>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, branch_id FROM fields WHERE id = ?1",
              rusqlite::params![id],
              decode_field,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_fields(&self, filter: FieldFilter) -> Result<Vec<Field>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        let mut limit = "";
        if let Some(name) = filter.name {
          filters.push("name = ?", name);
          limit = "LIMIT 1";
        } else if let Some(search) = filter.search.as_deref() {
          filters.search(&["name"], search);
        }
        if let Some(branch_id) = filter.branch_id {
          filters.push("branch_id = ?", branch_id);
        }
        let sql = format!(
          "SELECT id, name, branch_id FROM fields {} ORDER BY name {limit}",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_field,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_field(&self, id: i64, patch: FieldPatch) -> Result<Field> {
    self
      .call(move |conn| {
        let mut field = conn
          .query_row(
            "SELECT id, name, branch_id FROM fields WHERE id = ?1",
            rusqlite::params![id],
            decode_field,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Field, id))?;

        if let Some(name) = patch.name {
          if name != field.name {
            check_name_free(conn, "fields", EntityKind::Field, &name, Some(id))?;
          }
          field.name = name;
        }
        if let Some(branch_id) = patch.branch_id {
          require_id(conn, "branches", EntityKind::Branch, branch_id)?;
          field.branch_id = branch_id;
        }

        conn.execute(
          "UPDATE fields SET name = ?1, branch_id = ?2 WHERE id = ?3",
          rusqlite::params![field.name, field.branch_id, id],
        )?;
        Ok(field)
      })
      .await
  }

  async fn delete_field(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "fields", EntityKind::Field, id)?;
        guard_dependents(conn, EntityKind::Field, id, &[
          (
            "role fields",
            "SELECT 1 FROM role_fields WHERE field_id = ?1 LIMIT 1",
          ),
          (
            "project fields",
            "SELECT 1 FROM project_fields WHERE field_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute("DELETE FROM fields WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
  }
}

fn decode_field(row: &rusqlite::Row<'_>) -> rusqlite::Result<Field> {
  Ok(Field {
    id:        row.get(0)?,
    name:      row.get(1)?,
    branch_id: row.get(2)?,
  })
}

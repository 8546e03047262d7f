//! [`LinkStore`] impl: kind-dispatched attach/detach over the bare pair
//! tables, plus the typed listings of each pair's children.

use chrono::Utc;

use cadre_core::{
  catalog::{Field, Lookup},
  error::EntityKind,
  link::PairLink,
  person::PersonRole,
  store::LinkStore,
  Error,
};

use super::{exists_row, people::raw_role, require_id, SqliteStore};
use crate::error::Result;

/// Table and column names for one pair link:
/// (table, parent column, child column).
fn parts(link: PairLink) -> (&'static str, &'static str, &'static str) {
  match link {
    PairLink::CourseInstitution => {
      ("course_institutions", "course_id", "institution_id")
    }
    PairLink::CourseTeacher => ("course_teachers", "course_id", "person_role_id"),
    PairLink::ProjectField => ("project_fields", "project_id", "field_id"),
    PairLink::RoleField => ("role_fields", "person_role_id", "field_id"),
  }
}

fn end_table(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Course => "courses",
    EntityKind::Institution => "institutions",
    EntityKind::PersonRole => "person_roles",
    EntityKind::Project => "projects",
    EntityKind::Field => "fields",
    // PairLink::ends only ever names the kinds above.
    _ => unreachable!("not a pair link end"),
  }
}

fn decode_field(row: &rusqlite::Row<'_>) -> rusqlite::Result<Field> {
  Ok(Field {
    id:        row.get(0)?,
    name:      row.get(1)?,
    branch_id: row.get(2)?,
  })
}

impl LinkStore for SqliteStore {
  async fn attach(
    &self,
    link: PairLink,
    parent_id: i64,
    child_id: i64,
  ) -> Result<()> {
    self
      .call(move |conn| {
        let (parent_kind, child_kind) = link.ends();
        require_id(conn, end_table(parent_kind), parent_kind, parent_id)?;
        require_id(conn, end_table(child_kind), child_kind, child_id)?;
        let (table, parent_col, child_col) = parts(link);
        if exists_row(
          conn,
          &format!(
            "SELECT 1 FROM {table} WHERE {parent_col} = ?1 AND {child_col} = ?2"
          ),
          rusqlite::params![parent_id, child_id],
        )? {
          return Err(
            Error::duplicate(format!(
              "{child_kind} #{child_id} is already linked to \
               {parent_kind} #{parent_id}"
            ))
            .into(),
          );
        }
        conn.execute(
          &format!(
            "INSERT INTO {table} ({parent_col}, {child_col}) VALUES (?1, ?2)"
          ),
          rusqlite::params![parent_id, child_id],
        )?;
        Ok(())
      })
      .await
  }

  async fn detach(
    &self,
    link: PairLink,
    parent_id: i64,
    child_id: i64,
  ) -> Result<()> {
    self
      .call(move |conn| {
        let (parent_kind, child_kind) = link.ends();
        require_id(conn, end_table(parent_kind), parent_kind, parent_id)?;
        require_id(conn, end_table(child_kind), child_kind, child_id)?;
        let (table, parent_col, child_col) = parts(link);
        let deleted = conn.execute(
          &format!(
            "DELETE FROM {table} WHERE {parent_col} = ?1 AND {child_col} = ?2"
          ),
          rusqlite::params![parent_id, child_id],
        )?;
        if deleted == 0 {
          return Err(Error::not_found(child_kind, child_id).into());
        }
        Ok(())
      })
      .await
  }

  async fn course_institutions(&self, course_id: i64) -> Result<Vec<Lookup>> {
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, course_id)?;
        let mut stmt = conn.prepare(
          "SELECT i.id, i.name FROM course_institutions ci \
           JOIN institutions i ON i.id = ci.institution_id \
           WHERE ci.course_id = ?1 ORDER BY i.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![course_id], |row| {
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

  async fn course_teachers(&self, course_id: i64) -> Result<Vec<PersonRole>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, course_id)?;
        let mut stmt = conn.prepare(
          "SELECT pr.id, pr.person_id, pr.kind, pr.start_date, pr.end_date, \
                  pr.notes \
           FROM course_teachers ct \
           JOIN person_roles pr ON pr.id = ct.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           WHERE ct.course_id = ?1 ORDER BY p.last_name, p.first_name",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![course_id], raw_role)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(|r| r.into_person_role(now))
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn project_fields(&self, project_id: i64) -> Result<Vec<Field>> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        let mut stmt = conn.prepare(
          "SELECT f.id, f.name, f.branch_id FROM project_fields pf \
           JOIN fields f ON f.id = pf.field_id \
           WHERE pf.project_id = ?1 ORDER BY f.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![project_id], decode_field)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn role_fields(&self, person_role_id: i64) -> Result<Vec<Field>> {
    self
      .call(move |conn| {
        require_id(conn, "person_roles", EntityKind::PersonRole, person_role_id)?;
        let mut stmt = conn.prepare(
          "SELECT f.id, f.name, f.branch_id FROM role_fields rf \
           JOIN fields f ON f.id = rf.field_id \
           WHERE rf.person_role_id = ?1 ORDER BY f.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![person_role_id], decode_field)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }
}

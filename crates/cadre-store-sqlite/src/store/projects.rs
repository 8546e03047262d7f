//! [`ProjectStore`] impl: projects, membership, output reports.

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use cadre_core::{
  error::EntityKind,
  project::{
    NewProject, NewProjectMember, Project, ProjectMember, ProjectMemberPatch,
    ProjectPatch, ProjectStatus, ResearchOutputReport,
  },
  query::ProjectFilter,
  store::ProjectStore,
  temporal, Error,
};

use super::{exists_row, guard_dependents, require_id, Filters, SqliteStore};
use crate::{
  encode::{encode_dt, RawProject},
  error::Result,
};

const PROJECT_COLS: &str = "id, call_type_id, title, project_number, \
                            final_report_submitted, is_extended, start_date, \
                            end_date, notes";

fn raw_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProject> {
  Ok(RawProject {
    id:                     row.get(0)?,
    call_type_id:           row.get(1)?,
    title:                  row.get(2)?,
    project_number:         row.get(3)?,
    final_report_submitted: row.get(4)?,
    is_extended:            row.get(5)?,
    start_date:             row.get(6)?,
    end_date:               row.get(7)?,
    notes:                  row.get(8)?,
  })
}

fn decode_member(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectMember> {
  Ok(ProjectMember {
    id:                        row.get(0)?,
    project_id:                row.get(1)?,
    person_role_id:            row.get(2)?,
    is_principal_investigator: row.get(3)?,
    is_contact_person:         row.get(4)?,
    is_active:                 row.get(5)?,
  })
}

fn decode_report(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<ResearchOutputReport> {
  Ok(ResearchOutputReport {
    id:         row.get(0)?,
    project_id: row.get(1)?,
    link:       row.get(2)?,
  })
}

impl ProjectStore for SqliteStore {
  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let now = Utc::now();
    self
      .call(move |conn| {
        require_id(
          conn,
          "project_call_types",
          EntityKind::ProjectCallType,
          input.call_type_id,
        )?;
        if exists_row(
          conn,
          "SELECT 1 FROM projects WHERE project_number = ?1",
          rusqlite::params![&input.project_number],
        )? {
          return Err(
            Error::duplicate(format!(
              "project number {:?} already exists",
              input.project_number
            ))
            .into(),
          );
        }
        conn.execute(
          "INSERT INTO projects \
           (call_type_id, title, project_number, final_report_submitted, \
            is_extended, start_date, end_date, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.call_type_id,
            input.title,
            input.project_number,
            input.final_report_submitted,
            input.is_extended,
            input.start_date.map(encode_dt),
            input.end_date.map(encode_dt),
            input.notes,
          ],
        )?;
        Ok(Project {
          id: conn.last_insert_rowid(),
          call_type_id: input.call_type_id,
          title: input.title,
          project_number: input.project_number,
          final_report_submitted: input.final_report_submitted,
          is_extended: input.is_extended,
          start_date: input.start_date,
          end_date: input.end_date,
          notes: input.notes,
          status: ProjectStatus::derive(
            input.end_date,
            input.final_report_submitted,
            now,
          ),
        })
      })
      .await
  }

  async fn get_project(&self, id: i64) -> Result<Option<Project>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {PROJECT_COLS} FROM projects WHERE id = ?1"),
            rusqlite::params![id],
            raw_project,
          )
          .optional()?;
        Ok(raw.map(|r| r.into_project(now)).transpose()?)
      })
      .await
  }

  async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.call_type_id {
          filters.push("p.call_type_id = ?", id);
        }
        if let Some(title) = filter.title {
          filters.push("p.title = ?", title);
        }
        if let Some(number) = filter.project_number {
          filters.push("p.project_number = ?", number);
        }
        if let Some(submitted) = filter.final_report_submitted {
          filters.push("p.final_report_submitted = ?", submitted);
        }
        if let Some(extended) = filter.is_extended {
          filters.push("p.is_extended = ?", extended);
        }
        if let Some(status) = filter.status {
          // The SQL twin of ProjectStatus::derive.
          let today = encode_dt(temporal::start_of_day(now));
          match status {
            ProjectStatus::Ongoing => filters
              .push("(p.end_date IS NULL OR p.end_date >= ?)", today),
            ProjectStatus::AwaitingReport => filters.push(
              "(p.end_date IS NOT NULL AND p.end_date < ? \
                AND p.final_report_submitted = 0)",
              today,
            ),
            ProjectStatus::Completed => filters.push(
              "(p.end_date IS NOT NULL AND p.end_date < ? \
                AND p.final_report_submitted = 1)",
              today,
            ),
          }
        }
        if let Some(id) = filter.field_id {
          filters.push(
            "EXISTS (SELECT 1 FROM project_fields pf \
             WHERE pf.project_id = p.id AND pf.field_id = ?)",
            id,
          );
        }
        if let Some(id) = filter.branch_id {
          filters.push(
            "EXISTS (SELECT 1 FROM project_fields pf \
             JOIN fields f ON f.id = pf.field_id \
             WHERE pf.project_id = p.id AND f.branch_id = ?)",
            id,
          );
        }
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.title", "p.project_number"], search);
        }
        let sql = format!(
          "SELECT p.id, p.call_type_id, p.title, p.project_number, \
                  p.final_report_submitted, p.is_extended, p.start_date, \
                  p.end_date, p.notes \
           FROM projects p {} \
           ORDER BY p.start_date DESC, p.id",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            raw_project,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(|r| r.into_project(now))
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_project(&self, id: i64, patch: ProjectPatch) -> Result<Project> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut project = conn
          .query_row(
            &format!("SELECT {PROJECT_COLS} FROM projects WHERE id = ?1"),
            rusqlite::params![id],
            raw_project,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Project, id))?
          .into_project(now)?;

        if let Some(call_type_id) = patch.call_type_id {
          require_id(
            conn,
            "project_call_types",
            EntityKind::ProjectCallType,
            call_type_id,
          )?;
          project.call_type_id = call_type_id;
        }
        if let Some(title) = patch.title {
          project.title = title;
        }
        if let Some(number) = patch.project_number {
          if number != project.project_number
            && exists_row(
              conn,
              "SELECT 1 FROM projects WHERE project_number = ?1 AND id != ?2",
              rusqlite::params![&number, id],
            )?
          {
            return Err(
              Error::duplicate(format!(
                "project number {number:?} already exists"
              ))
              .into(),
            );
          }
          project.project_number = number;
        }
        if let Some(submitted) = patch.final_report_submitted {
          project.final_report_submitted = submitted;
        }
        if let Some(extended) = patch.is_extended {
          project.is_extended = extended;
        }
        patch.start_date.apply(&mut project.start_date);
        patch.end_date.apply(&mut project.end_date);
        patch.notes.apply(&mut project.notes);

        conn.execute(
          "UPDATE projects SET call_type_id = ?1, title = ?2, \
           project_number = ?3, final_report_submitted = ?4, is_extended = ?5, \
           start_date = ?6, end_date = ?7, notes = ?8 WHERE id = ?9",
          rusqlite::params![
            project.call_type_id,
            project.title,
            project.project_number,
            project.final_report_submitted,
            project.is_extended,
            project.start_date.map(encode_dt),
            project.end_date.map(encode_dt),
            project.notes,
            id,
          ],
        )?;
        project.status = ProjectStatus::derive(
          project.end_date,
          project.final_report_submitted,
          now,
        );
        Ok(project)
      })
      .await
  }

  async fn delete_project(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, id)?;
        guard_dependents(conn, EntityKind::Project, id, &[
          (
            "project members",
            "SELECT 1 FROM project_members WHERE project_id = ?1 LIMIT 1",
          ),
          (
            "field links",
            "SELECT 1 FROM project_fields WHERE project_id = ?1 LIMIT 1",
          ),
          (
            "output reports",
            "SELECT 1 FROM research_output_reports WHERE project_id = ?1 LIMIT 1",
          ),
          (
            "decision letters",
            "SELECT 1 FROM decision_letters \
             WHERE parent_kind = 'project' AND parent_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute("DELETE FROM projects WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn add_project_member(
    &self,
    project_id: i64,
    input: NewProjectMember,
  ) -> Result<ProjectMember> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        require_id(
          conn,
          "person_roles",
          EntityKind::PersonRole,
          input.person_role_id,
        )?;
        if exists_row(
          conn,
          "SELECT 1 FROM project_members \
           WHERE project_id = ?1 AND person_role_id = ?2",
          rusqlite::params![project_id, input.person_role_id],
        )? {
          return Err(
            Error::duplicate(format!(
              "person role #{} is already a member of project #{project_id}",
              input.person_role_id
            ))
            .into(),
          );
        }
        conn.execute(
          "INSERT INTO project_members \
           (project_id, person_role_id, is_principal_investigator, \
            is_contact_person, is_active) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            project_id,
            input.person_role_id,
            input.is_principal_investigator,
            input.is_contact_person,
            input.is_active,
          ],
        )?;
        Ok(ProjectMember {
          id: conn.last_insert_rowid(),
          project_id,
          person_role_id: input.person_role_id,
          is_principal_investigator: input.is_principal_investigator,
          is_contact_person: input.is_contact_person,
          is_active: input.is_active,
        })
      })
      .await
  }

  async fn list_project_members(
    &self,
    project_id: i64,
  ) -> Result<Vec<ProjectMember>> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        let mut stmt = conn.prepare(
          "SELECT m.id, m.project_id, m.person_role_id, \
                  m.is_principal_investigator, m.is_contact_person, m.is_active \
           FROM project_members m \
           JOIN person_roles pr ON pr.id = m.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           WHERE m.project_id = ?1 \
           ORDER BY m.is_principal_investigator DESC, p.last_name, p.first_name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![project_id], decode_member)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_project_member(
    &self,
    project_id: i64,
    person_role_id: i64,
    patch: ProjectMemberPatch,
  ) -> Result<ProjectMember> {
    self
      .call(move |conn| {
        let mut member = conn
          .query_row(
            "SELECT id, project_id, person_role_id, is_principal_investigator, \
                    is_contact_person, is_active \
             FROM project_members WHERE project_id = ?1 AND person_role_id = ?2",
            rusqlite::params![project_id, person_role_id],
            decode_member,
          )
          .optional()?
          .ok_or_else(|| {
            Error::not_found(EntityKind::ProjectMember, person_role_id)
          })?;

        if let Some(pi) = patch.is_principal_investigator {
          member.is_principal_investigator = pi;
        }
        if let Some(contact) = patch.is_contact_person {
          member.is_contact_person = contact;
        }
        if let Some(active) = patch.is_active {
          member.is_active = active;
        }

        conn.execute(
          "UPDATE project_members SET is_principal_investigator = ?1, \
           is_contact_person = ?2, is_active = ?3 WHERE id = ?4",
          rusqlite::params![
            member.is_principal_investigator,
            member.is_contact_person,
            member.is_active,
            member.id,
          ],
        )?;
        Ok(member)
      })
      .await
  }

  async fn remove_project_member(
    &self,
    project_id: i64,
    person_role_id: i64,
  ) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        require_id(conn, "person_roles", EntityKind::PersonRole, person_role_id)?;
        let deleted = conn.execute(
          "DELETE FROM project_members \
           WHERE project_id = ?1 AND person_role_id = ?2",
          rusqlite::params![project_id, person_role_id],
        )?;
        if deleted == 0 {
          return Err(
            Error::not_found(EntityKind::ProjectMember, person_role_id).into(),
          );
        }
        Ok(())
      })
      .await
  }

  // ── Output reports ────────────────────────────────────────────────────────

  async fn add_output_report(
    &self,
    project_id: i64,
    link: String,
  ) -> Result<ResearchOutputReport> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        conn.execute(
          "INSERT INTO research_output_reports (project_id, link) VALUES (?1, ?2)",
          rusqlite::params![project_id, link],
        )?;
        Ok(ResearchOutputReport {
          id: conn.last_insert_rowid(),
          project_id,
          link,
        })
      })
      .await
  }

  async fn list_output_reports(
    &self,
    project_id: i64,
  ) -> Result<Vec<ResearchOutputReport>> {
    self
      .call(move |conn| {
        require_id(conn, "projects", EntityKind::Project, project_id)?;
        let mut stmt = conn.prepare(
          "SELECT id, project_id, link FROM research_output_reports \
           WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![project_id], decode_report)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_output_report(
    &self,
    id: i64,
    link: String,
  ) -> Result<ResearchOutputReport> {
    self
      .call(move |conn| {
        let report = conn
          .query_row(
            "SELECT id, project_id, link FROM research_output_reports \
             WHERE id = ?1",
            rusqlite::params![id],
            decode_report,
          )
          .optional()?
          .ok_or_else(|| {
            Error::not_found(EntityKind::ResearchOutputReport, id)
          })?;

        conn.execute(
          "UPDATE research_output_reports SET link = ?1 WHERE id = ?2",
          rusqlite::params![link, id],
        )?;
        Ok(ResearchOutputReport { link, ..report })
      })
      .await
  }

  async fn delete_output_report(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM research_output_reports WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if deleted == 0 {
          return Err(
            Error::not_found(EntityKind::ResearchOutputReport, id).into(),
          );
        }
        Ok(())
      })
      .await
  }
}

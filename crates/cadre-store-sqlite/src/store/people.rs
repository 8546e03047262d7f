//! [`PeopleStore`] impl: people, roles, detail records, affiliations and
//! supervisions.

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use cadre_core::{
  error::EntityKind,
  link::{Affiliation, NewAffiliation, NewSupervision, Supervision},
  person::{
    NewPerson, NewPersonRole, NewPhdStudent, NewPostdoc, NewResearcher,
    Person, PersonPatch, PersonRole, PersonRolePatch, PhdStudent,
    PhdStudentPatch, Postdoc, PostdocPatch, Researcher, ResearcherPatch,
    RoleKind,
  },
  query::{
    PersonFilter, PersonRoleFilter, PhdStudentFilter, PostdocFilter,
    ResearcherFilter, SupervisionFilter,
  },
  store::PeopleStore,
  temporal, Error,
};

use super::{exists_row, guard_dependents, require_id, Filters, SqliteStore};
use crate::{
  encode::{
    decode_role_kind, encode_dt, encode_role_kind, RawAffiliation,
    RawPersonRole, RawPhdStudent, RawPostdoc,
  },
  error::{CallResult, Result},
};

const ROLE_COLS: &str = "id, person_id, kind, start_date, end_date, notes";
const PHD_COLS: &str = "id, person_role_id, cohort_number, is_affiliated, \
                        department, discipline, project_title, \
                        planned_defense_date, is_graduated, current_title, \
                        current_organization, link, notes";
const POSTDOC_COLS: &str = "id, person_role_id, cohort_number, department, \
                            discipline, project_title, is_incoming, \
                            is_graduated, current_title_id, \
                            current_title_other, current_institution_id, \
                            current_institution_other, link, notes";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn decode_person(row: &rusqlite::Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    id:         row.get(0)?,
    first_name: row.get(1)?,
    last_name:  row.get(2)?,
    email:      row.get(3)?,
  })
}

pub(super) fn raw_role(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawPersonRole> {
  Ok(RawPersonRole {
    id:         row.get(0)?,
    person_id:  row.get(1)?,
    kind:       row.get(2)?,
    start_date: row.get(3)?,
    end_date:   row.get(4)?,
    notes:      row.get(5)?,
  })
}

fn decode_researcher(row: &rusqlite::Row<'_>) -> rusqlite::Result<Researcher> {
  Ok(Researcher {
    id:                row.get(0)?,
    person_role_id:    row.get(1)?,
    title_id:          row.get(2)?,
    original_title_id: row.get(3)?,
    link:              row.get(4)?,
    notes:             row.get(5)?,
  })
}

fn raw_phd(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPhdStudent> {
  Ok(RawPhdStudent {
    id:                   row.get(0)?,
    person_role_id:       row.get(1)?,
    cohort_number:        row.get(2)?,
    is_affiliated:        row.get(3)?,
    department:           row.get(4)?,
    discipline:           row.get(5)?,
    project_title:        row.get(6)?,
    planned_defense_date: row.get(7)?,
    is_graduated:         row.get(8)?,
    current_title:        row.get(9)?,
    current_organization: row.get(10)?,
    link:                 row.get(11)?,
    notes:                row.get(12)?,
  })
}

fn raw_postdoc(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPostdoc> {
  Ok(RawPostdoc {
    id:                        row.get(0)?,
    person_role_id:            row.get(1)?,
    cohort_number:             row.get(2)?,
    department:                row.get(3)?,
    discipline:                row.get(4)?,
    project_title:             row.get(5)?,
    is_incoming:               row.get(6)?,
    is_graduated:              row.get(7)?,
    current_title_id:          row.get(8)?,
    current_title_other:       row.get(9)?,
    current_institution_id:    row.get(10)?,
    current_institution_other: row.get(11)?,
    link:                      row.get(12)?,
    notes:                     row.get(13)?,
  })
}

fn raw_affiliation(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAffiliation> {
  Ok(RawAffiliation {
    id:             row.get(0)?,
    person_role_id: row.get(1)?,
    institution_id: row.get(2)?,
    start_date:     row.get(3)?,
    end_date:       row.get(4)?,
  })
}

fn decode_supervision(row: &rusqlite::Row<'_>) -> rusqlite::Result<Supervision> {
  Ok(Supervision {
    id:                 row.get(0)?,
    supervisor_role_id: row.get(1)?,
    student_role_id:    row.get(2)?,
    is_main:            row.get(3)?,
  })
}

// ─── Shared checks ───────────────────────────────────────────────────────────

/// A detail record may only attach to a role of its own kind; a mismatch is
/// a programming error on the caller's side, not a user error.
fn require_role_kind(
  conn: &rusqlite::Connection,
  role_id: i64,
  expected: RoleKind,
) -> CallResult<()> {
  let stored: Option<String> = conn
    .query_row(
      "SELECT kind FROM person_roles WHERE id = ?1",
      rusqlite::params![role_id],
      |row| row.get(0),
    )
    .optional()?;
  match stored {
    None => Err(Error::not_found(EntityKind::PersonRole, role_id).into()),
    Some(kind) => {
      if decode_role_kind(&kind)? == expected {
        Ok(())
      } else {
        Err(
          Error::invariant(format!(
            "person role #{role_id} has kind {kind}, expected {}",
            encode_role_kind(expected),
          ))
          .into(),
        )
      }
    }
  }
}

/// Role-detail exclusivity: at most one detail record per person role.
fn check_detail_free(
  conn: &rusqlite::Connection,
  table: &str,
  role_id: i64,
) -> CallResult<()> {
  let taken = exists_row(
    conn,
    &format!("SELECT 1 FROM {table} WHERE person_role_id = ?1"),
    [role_id],
  )?;
  if taken {
    Err(
      Error::duplicate(format!(
        "person role #{role_id} already has a detail record"
      ))
      .into(),
    )
  } else {
    Ok(())
  }
}

/// The join-based researcher/student/postdoc filters, all phrased as EXISTS
/// probes against the shared `pr` (person_roles) alias.
fn push_role_link_filters(
  filters: &mut Filters,
  institution_id: Option<i64>,
  field_id: Option<i64>,
  branch_id: Option<i64>,
) {
  if let Some(id) = institution_id {
    filters.push(
      "EXISTS (SELECT 1 FROM affiliations af \
       WHERE af.person_role_id = pr.id AND af.institution_id = ?)",
      id,
    );
  }
  if let Some(id) = field_id {
    filters.push(
      "EXISTS (SELECT 1 FROM role_fields rf \
       WHERE rf.person_role_id = pr.id AND rf.field_id = ?)",
      id,
    );
  }
  if let Some(id) = branch_id {
    filters.push(
      "EXISTS (SELECT 1 FROM role_fields rf \
       JOIN fields f ON f.id = rf.field_id \
       WHERE rf.person_role_id = pr.id AND f.branch_id = ?)",
      id,
    );
  }
}

// ─── Impl ────────────────────────────────────────────────────────────────────

impl PeopleStore for SqliteStore {
  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    self
      .call(move |conn| {
        if exists_row(
          conn,
          "SELECT 1 FROM people WHERE email = ?1",
          rusqlite::params![&input.email],
        )? {
          return Err(
            Error::duplicate(format!(
              "person with email {:?} already exists",
              input.email
            ))
            .into(),
          );
        }
        conn.execute(
          "INSERT INTO people (first_name, last_name, email) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.first_name, input.last_name, input.email],
        )?;
        Ok(Person {
          id:         conn.last_insert_rowid(),
          first_name: input.first_name,
          last_name:  input.last_name,
          email:      input.email,
        })
      })
      .await
  }

  async fn get_person(&self, id: i64) -> Result<Option<Person>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, first_name, last_name, email FROM people WHERE id = ?1",
              rusqlite::params![id],
              decode_person,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_people(&self, filter: PersonFilter) -> Result<Vec<Person>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["first_name", "last_name", "email"], search);
        }
        let sql = format!(
          "SELECT id, first_name, last_name, email FROM people {} \
           ORDER BY last_name, first_name",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_person,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_person(&self, id: i64, patch: PersonPatch) -> Result<Person> {
    self
      .call(move |conn| {
        let mut person = conn
          .query_row(
            "SELECT id, first_name, last_name, email FROM people WHERE id = ?1",
            rusqlite::params![id],
            decode_person,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Person, id))?;

        if let Some(first_name) = patch.first_name {
          person.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
          person.last_name = last_name;
        }
        if let Some(email) = patch.email {
          if email != person.email
            && exists_row(
              conn,
              "SELECT 1 FROM people WHERE email = ?1 AND id != ?2",
              rusqlite::params![&email, id],
            )?
          {
            return Err(
              Error::duplicate(format!(
                "person with email {email:?} already exists"
              ))
              .into(),
            );
          }
          person.email = email;
        }

        conn.execute(
          "UPDATE people SET first_name = ?1, last_name = ?2, email = ?3 \
           WHERE id = ?4",
          rusqlite::params![person.first_name, person.last_name, person.email, id],
        )?;
        Ok(person)
      })
      .await
  }

  async fn delete_person(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "people", EntityKind::Person, id)?;
        guard_dependents(conn, EntityKind::Person, id, &[(
          "person roles",
          "SELECT 1 FROM person_roles WHERE person_id = ?1 LIMIT 1",
        )])?;
        conn.execute("DELETE FROM people WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn create_person_role(&self, input: NewPersonRole) -> Result<PersonRole> {
    let now = Utc::now();
    self
      .call(move |conn| {
        require_id(conn, "people", EntityKind::Person, input.person_id)?;
        let start_date = input.start_date.unwrap_or(now);
        conn.execute(
          "INSERT INTO person_roles (person_id, kind, start_date, end_date, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.person_id,
            encode_role_kind(input.kind),
            encode_dt(start_date),
            input.end_date.map(encode_dt),
            input.notes,
          ],
        )?;
        Ok(PersonRole {
          id: conn.last_insert_rowid(),
          person_id: input.person_id,
          kind: input.kind,
          start_date,
          end_date: input.end_date,
          notes: input.notes,
          is_active: temporal::is_active_at(input.end_date, now),
        })
      })
      .await
  }

  async fn get_person_role(&self, id: i64) -> Result<Option<PersonRole>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {ROLE_COLS} FROM person_roles WHERE id = ?1"),
            rusqlite::params![id],
            raw_role,
          )
          .optional()?;
        Ok(raw.map(|r| r.into_person_role(now)).transpose()?)
      })
      .await
  }

  async fn list_person_roles(
    &self,
    filter: PersonRoleFilter,
  ) -> Result<Vec<PersonRole>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(person_id) = filter.person_id {
          filters.push("person_id = ?", person_id);
        }
        if let Some(kind) = filter.kind {
          filters.push("kind = ?", encode_role_kind(kind));
        }
        if let Some(active) = filter.is_active {
          filters.active("end_date", active, now);
        }
        let sql = format!(
          "SELECT {ROLE_COLS} FROM person_roles {} ORDER BY start_date DESC, id",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(filters.into_params()), raw_role)?
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

  async fn update_person_role(
    &self,
    id: i64,
    patch: PersonRolePatch,
  ) -> Result<PersonRole> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut role = conn
          .query_row(
            &format!("SELECT {ROLE_COLS} FROM person_roles WHERE id = ?1"),
            rusqlite::params![id],
            raw_role,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::PersonRole, id))?
          .into_person_role(now)?;

        if let Some(start_date) = patch.start_date {
          role.start_date = start_date;
        }
        patch.end_date.apply(&mut role.end_date);
        patch.notes.apply(&mut role.notes);

        conn.execute(
          "UPDATE person_roles SET start_date = ?1, end_date = ?2, notes = ?3 \
           WHERE id = ?4",
          rusqlite::params![
            encode_dt(role.start_date),
            role.end_date.map(encode_dt),
            role.notes,
            id,
          ],
        )?;
        role.is_active = temporal::is_active_at(role.end_date, now);
        Ok(role)
      })
      .await
  }

  async fn delete_person_role(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "person_roles", EntityKind::PersonRole, id)?;
        guard_dependents(conn, EntityKind::PersonRole, id, &[
          ("researcher record", "SELECT 1 FROM researchers WHERE person_role_id = ?1 LIMIT 1"),
          ("PhD student record", "SELECT 1 FROM phd_students WHERE person_role_id = ?1 LIMIT 1"),
          ("postdoc record", "SELECT 1 FROM postdocs WHERE person_role_id = ?1 LIMIT 1"),
          ("affiliations", "SELECT 1 FROM affiliations WHERE person_role_id = ?1 LIMIT 1"),
          ("role fields", "SELECT 1 FROM role_fields WHERE person_role_id = ?1 LIMIT 1"),
          ("project memberships", "SELECT 1 FROM project_members WHERE person_role_id = ?1 LIMIT 1"),
          (
            "supervisions",
            "SELECT 1 FROM supervisions \
             WHERE supervisor_role_id = ?1 OR student_role_id = ?1 LIMIT 1",
          ),
          ("course teacher links", "SELECT 1 FROM course_teachers WHERE person_role_id = ?1 LIMIT 1"),
          (
            "decision letters",
            "SELECT 1 FROM decision_letters \
             WHERE parent_kind = 'person_role' AND parent_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute(
          "DELETE FROM person_roles WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  // ── Researcher detail ─────────────────────────────────────────────────────

  async fn create_researcher(&self, input: NewResearcher) -> Result<Researcher> {
    self
      .call(move |conn| {
        require_role_kind(conn, input.person_role_id, RoleKind::Researcher)?;
        check_detail_free(conn, "researchers", input.person_role_id)?;
        for title_id in [input.title_id, input.original_title_id].into_iter().flatten() {
          require_id(conn, "researcher_titles", EntityKind::ResearcherTitle, title_id)?;
        }
        conn.execute(
          "INSERT INTO researchers \
           (person_role_id, title_id, original_title_id, link, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.person_role_id,
            input.title_id,
            input.original_title_id,
            input.link,
            input.notes,
          ],
        )?;
        Ok(Researcher {
          id:                conn.last_insert_rowid(),
          person_role_id:    input.person_role_id,
          title_id:          input.title_id,
          original_title_id: input.original_title_id,
          link:              input.link,
          notes:             input.notes,
        })
      })
      .await
  }

  async fn get_researcher(&self, id: i64) -> Result<Option<Researcher>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, person_role_id, title_id, original_title_id, link, notes \
               FROM researchers WHERE id = ?1",
              rusqlite::params![id],
              decode_researcher,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_researchers(
    &self,
    filter: ResearcherFilter,
  ) -> Result<Vec<Researcher>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.person_role_id {
          filters.push("r.person_role_id = ?", id);
        }
        if let Some(active) = filter.is_active {
          filters.active("pr.end_date", active, now);
        }
        if let Some(id) = filter.title_id {
          filters.push("r.title_id = ?", id);
        }
        push_role_link_filters(
          &mut filters,
          filter.institution_id,
          filter.field_id,
          filter.branch_id,
        );
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.first_name", "p.last_name", "p.email"], search);
        }
        let sql = format!(
          "SELECT r.id, r.person_role_id, r.title_id, r.original_title_id, \
                  r.link, r.notes \
           FROM researchers r \
           JOIN person_roles pr ON pr.id = r.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           {} ORDER BY p.last_name, p.first_name",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_researcher,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_researcher(
    &self,
    id: i64,
    patch: ResearcherPatch,
  ) -> Result<Researcher> {
    self
      .call(move |conn| {
        let mut researcher = conn
          .query_row(
            "SELECT id, person_role_id, title_id, original_title_id, link, notes \
             FROM researchers WHERE id = ?1",
            rusqlite::params![id],
            decode_researcher,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Researcher, id))?;

        patch.title_id.apply(&mut researcher.title_id);
        patch.original_title_id.apply(&mut researcher.original_title_id);
        patch.link.apply(&mut researcher.link);
        patch.notes.apply(&mut researcher.notes);
        for title_id in [researcher.title_id, researcher.original_title_id]
          .into_iter()
          .flatten()
        {
          require_id(conn, "researcher_titles", EntityKind::ResearcherTitle, title_id)?;
        }

        conn.execute(
          "UPDATE researchers SET title_id = ?1, original_title_id = ?2, \
           link = ?3, notes = ?4 WHERE id = ?5",
          rusqlite::params![
            researcher.title_id,
            researcher.original_title_id,
            researcher.link,
            researcher.notes,
            id,
          ],
        )?;
        Ok(researcher)
      })
      .await
  }

  async fn delete_researcher(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "researchers", EntityKind::Researcher, id)?;
        conn.execute(
          "DELETE FROM researchers WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  // ── PhD student detail ────────────────────────────────────────────────────

  async fn create_phd_student(&self, input: NewPhdStudent) -> Result<PhdStudent> {
    self
      .call(move |conn| {
        require_role_kind(conn, input.person_role_id, RoleKind::PhdStudent)?;
        check_detail_free(conn, "phd_students", input.person_role_id)?;
        conn.execute(
          "INSERT INTO phd_students \
           (person_role_id, cohort_number, is_affiliated, department, \
            discipline, project_title, planned_defense_date, is_graduated, \
            current_title, current_organization, link, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            input.person_role_id,
            input.cohort_number,
            input.is_affiliated,
            input.department,
            input.discipline,
            input.project_title,
            input.planned_defense_date.map(encode_dt),
            input.is_graduated,
            input.current_title,
            input.current_organization,
            input.link,
            input.notes,
          ],
        )?;
        Ok(PhdStudent {
          id:                   conn.last_insert_rowid(),
          person_role_id:       input.person_role_id,
          cohort_number:        input.cohort_number,
          is_affiliated:        input.is_affiliated,
          department:           input.department,
          discipline:           input.discipline,
          project_title:        input.project_title,
          planned_defense_date: input.planned_defense_date,
          is_graduated:         input.is_graduated,
          current_title:        input.current_title,
          current_organization: input.current_organization,
          link:                 input.link,
          notes:                input.notes,
        })
      })
      .await
  }

  async fn get_phd_student(&self, id: i64) -> Result<Option<PhdStudent>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {PHD_COLS} FROM phd_students WHERE id = ?1"),
            rusqlite::params![id],
            raw_phd,
          )
          .optional()?;
        Ok(raw.map(RawPhdStudent::into_phd_student).transpose()?)
      })
      .await
  }

  async fn list_phd_students(
    &self,
    filter: PhdStudentFilter,
  ) -> Result<Vec<PhdStudent>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.person_role_id {
          filters.push("s.person_role_id = ?", id);
        }
        if let Some(active) = filter.is_active {
          filters.active("pr.end_date", active, now);
        }
        if let Some(cohort) = filter.cohort_number {
          filters.push("s.cohort_number = ?", cohort);
        }
        if let Some(affiliated) = filter.is_affiliated {
          filters.push("s.is_affiliated = ?", affiliated);
        }
        if let Some(graduated) = filter.is_graduated {
          filters.push("s.is_graduated = ?", graduated);
        }
        push_role_link_filters(
          &mut filters,
          filter.institution_id,
          filter.field_id,
          filter.branch_id,
        );
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.first_name", "p.last_name", "p.email"], search);
        }
        let sql = format!(
          "SELECT s.id, s.person_role_id, s.cohort_number, s.is_affiliated, \
                  s.department, s.discipline, s.project_title, \
                  s.planned_defense_date, s.is_graduated, s.current_title, \
                  s.current_organization, s.link, s.notes \
           FROM phd_students s \
           JOIN person_roles pr ON pr.id = s.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           {} ORDER BY p.last_name, p.first_name",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(filters.into_params()), raw_phd)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawPhdStudent::into_phd_student)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_phd_student(
    &self,
    id: i64,
    patch: PhdStudentPatch,
  ) -> Result<PhdStudent> {
    self
      .call(move |conn| {
        let mut student = conn
          .query_row(
            &format!("SELECT {PHD_COLS} FROM phd_students WHERE id = ?1"),
            rusqlite::params![id],
            raw_phd,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::PhdStudent, id))?
          .into_phd_student()?;

        patch.cohort_number.apply(&mut student.cohort_number);
        if let Some(affiliated) = patch.is_affiliated {
          student.is_affiliated = affiliated;
        }
        patch.department.apply(&mut student.department);
        patch.discipline.apply(&mut student.discipline);
        patch.project_title.apply(&mut student.project_title);
        patch
          .planned_defense_date
          .apply(&mut student.planned_defense_date);
        if let Some(graduated) = patch.is_graduated {
          student.is_graduated = graduated;
        }
        patch.current_title.apply(&mut student.current_title);
        patch
          .current_organization
          .apply(&mut student.current_organization);
        patch.link.apply(&mut student.link);
        patch.notes.apply(&mut student.notes);

        conn.execute(
          "UPDATE phd_students SET cohort_number = ?1, is_affiliated = ?2, \
           department = ?3, discipline = ?4, project_title = ?5, \
           planned_defense_date = ?6, is_graduated = ?7, current_title = ?8, \
           current_organization = ?9, link = ?10, notes = ?11 WHERE id = ?12",
          rusqlite::params![
            student.cohort_number,
            student.is_affiliated,
            student.department,
            student.discipline,
            student.project_title,
            student.planned_defense_date.map(encode_dt),
            student.is_graduated,
            student.current_title,
            student.current_organization,
            student.link,
            student.notes,
            id,
          ],
        )?;
        Ok(student)
      })
      .await
  }

  async fn delete_phd_student(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "phd_students", EntityKind::PhdStudent, id)?;
        guard_dependents(conn, EntityKind::PhdStudent, id, &[
          (
            "enrollments",
            "SELECT 1 FROM enrollments WHERE phd_student_id = ?1 LIMIT 1",
          ),
          (
            "student activities",
            "SELECT 1 FROM student_activities WHERE phd_student_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute(
          "DELETE FROM phd_students WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  // ── Postdoc detail ────────────────────────────────────────────────────────

  async fn create_postdoc(&self, input: NewPostdoc) -> Result<Postdoc> {
    self
      .call(move |conn| {
        require_role_kind(conn, input.person_role_id, RoleKind::Postdoc)?;
        check_detail_free(conn, "postdocs", input.person_role_id)?;
        if let Some(title_id) = input.current_title_id {
          require_id(conn, "researcher_titles", EntityKind::ResearcherTitle, title_id)?;
        }
        if let Some(inst_id) = input.current_institution_id {
          require_id(conn, "institutions", EntityKind::Institution, inst_id)?;
        }
        conn.execute(
          "INSERT INTO postdocs \
           (person_role_id, cohort_number, department, discipline, \
            project_title, is_incoming, is_graduated, current_title_id, \
            current_title_other, current_institution_id, \
            current_institution_other, link, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            input.person_role_id,
            input.cohort_number,
            input.department,
            input.discipline,
            input.project_title,
            input.is_incoming,
            input.is_graduated,
            input.current_title_id,
            input.current_title_other,
            input.current_institution_id,
            input.current_institution_other,
            input.link,
            input.notes,
          ],
        )?;
        Ok(Postdoc {
          id:                        conn.last_insert_rowid(),
          person_role_id:            input.person_role_id,
          cohort_number:             input.cohort_number,
          department:                input.department,
          discipline:                input.discipline,
          project_title:             input.project_title,
          is_incoming:               input.is_incoming,
          is_graduated:              input.is_graduated,
          current_title_id:          input.current_title_id,
          current_title_other:       input.current_title_other,
          current_institution_id:    input.current_institution_id,
          current_institution_other: input.current_institution_other,
          link:                      input.link,
          notes:                     input.notes,
        })
      })
      .await
  }

  async fn get_postdoc(&self, id: i64) -> Result<Option<Postdoc>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POSTDOC_COLS} FROM postdocs WHERE id = ?1"),
              rusqlite::params![id],
              raw_postdoc,
            )
            .optional()?
            .map(RawPostdoc::into_postdoc),
        )
      })
      .await
  }

  async fn list_postdocs(&self, filter: PostdocFilter) -> Result<Vec<Postdoc>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.person_role_id {
          filters.push("pd.person_role_id = ?", id);
        }
        if let Some(active) = filter.is_active {
          filters.active("pr.end_date", active, now);
        }
        if let Some(cohort) = filter.cohort_number {
          filters.push("pd.cohort_number = ?", cohort);
        }
        if let Some(incoming) = filter.is_incoming {
          filters.push("pd.is_incoming = ?", incoming);
        }
        if let Some(graduated) = filter.is_graduated {
          filters.push("pd.is_graduated = ?", graduated);
        }
        push_role_link_filters(
          &mut filters,
          filter.institution_id,
          filter.field_id,
          filter.branch_id,
        );
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.first_name", "p.last_name", "p.email"], search);
        }
        let sql = format!(
          "SELECT pd.id, pd.person_role_id, pd.cohort_number, pd.department, \
                  pd.discipline, pd.project_title, pd.is_incoming, \
                  pd.is_graduated, pd.current_title_id, pd.current_title_other, \
                  pd.current_institution_id, pd.current_institution_other, \
                  pd.link, pd.notes \
           FROM postdocs pd \
           JOIN person_roles pr ON pr.id = pd.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           {} ORDER BY p.last_name, p.first_name",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            raw_postdoc,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws.into_iter().map(RawPostdoc::into_postdoc).collect())
      })
      .await
  }

  async fn update_postdoc(&self, id: i64, patch: PostdocPatch) -> Result<Postdoc> {
    self
      .call(move |conn| {
        let mut postdoc = conn
          .query_row(
            &format!("SELECT {POSTDOC_COLS} FROM postdocs WHERE id = ?1"),
            rusqlite::params![id],
            raw_postdoc,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Postdoc, id))?
          .into_postdoc();

        patch.cohort_number.apply(&mut postdoc.cohort_number);
        patch.department.apply(&mut postdoc.department);
        patch.discipline.apply(&mut postdoc.discipline);
        patch.project_title.apply(&mut postdoc.project_title);
        if let Some(incoming) = patch.is_incoming {
          postdoc.is_incoming = incoming;
        }
        if let Some(graduated) = patch.is_graduated {
          postdoc.is_graduated = graduated;
        }
        patch.current_title_id.apply(&mut postdoc.current_title_id);
        patch.current_title_other.apply(&mut postdoc.current_title_other);
        patch
          .current_institution_id
          .apply(&mut postdoc.current_institution_id);
        patch
          .current_institution_other
          .apply(&mut postdoc.current_institution_other);
        patch.link.apply(&mut postdoc.link);
        patch.notes.apply(&mut postdoc.notes);

        if let Some(title_id) = postdoc.current_title_id {
          require_id(conn, "researcher_titles", EntityKind::ResearcherTitle, title_id)?;
        }
        if let Some(inst_id) = postdoc.current_institution_id {
          require_id(conn, "institutions", EntityKind::Institution, inst_id)?;
        }

        conn.execute(
          "UPDATE postdocs SET cohort_number = ?1, department = ?2, \
           discipline = ?3, project_title = ?4, is_incoming = ?5, \
           is_graduated = ?6, current_title_id = ?7, current_title_other = ?8, \
           current_institution_id = ?9, current_institution_other = ?10, \
           link = ?11, notes = ?12 WHERE id = ?13",
          rusqlite::params![
            postdoc.cohort_number,
            postdoc.department,
            postdoc.discipline,
            postdoc.project_title,
            postdoc.is_incoming,
            postdoc.is_graduated,
            postdoc.current_title_id,
            postdoc.current_title_other,
            postdoc.current_institution_id,
            postdoc.current_institution_other,
            postdoc.link,
            postdoc.notes,
            id,
          ],
        )?;
        Ok(postdoc)
      })
      .await
  }

  async fn delete_postdoc(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "postdocs", EntityKind::Postdoc, id)?;
        conn.execute("DELETE FROM postdocs WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
  }

  // ── Affiliations ──────────────────────────────────────────────────────────

  async fn add_affiliation(
    &self,
    person_role_id: i64,
    input: NewAffiliation,
  ) -> Result<Affiliation> {
    let now = Utc::now();
    self
      .call(move |conn| {
        require_id(conn, "person_roles", EntityKind::PersonRole, person_role_id)?;
        require_id(conn, "institutions", EntityKind::Institution, input.institution_id)?;
        if let (Some(start), Some(end)) = (input.start_date, input.end_date)
          && end < start
        {
          return Err(
            Error::invariant("affiliation end date precedes its start date")
              .into(),
          );
        }
        conn.execute(
          "INSERT INTO affiliations \
           (person_role_id, institution_id, start_date, end_date) \
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            person_role_id,
            input.institution_id,
            input.start_date.map(encode_dt),
            input.end_date.map(encode_dt),
          ],
        )?;
        Ok(Affiliation {
          id: conn.last_insert_rowid(),
          person_role_id,
          institution_id: input.institution_id,
          start_date: input.start_date,
          end_date: input.end_date,
          is_active: temporal::is_active_at(input.end_date, now),
        })
      })
      .await
  }

  async fn list_affiliations(&self, person_role_id: i64) -> Result<Vec<Affiliation>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        require_id(conn, "person_roles", EntityKind::PersonRole, person_role_id)?;
        let mut stmt = conn.prepare(
          "SELECT id, person_role_id, institution_id, start_date, end_date \
           FROM affiliations WHERE person_role_id = ?1 \
           ORDER BY start_date DESC, id",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![person_role_id], raw_affiliation)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(|r| r.into_affiliation(now))
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn remove_affiliation(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM affiliations WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if deleted == 0 {
          return Err(Error::not_found(EntityKind::Affiliation, id).into());
        }
        Ok(())
      })
      .await
  }

  // ── Supervisions ──────────────────────────────────────────────────────────

  async fn add_supervision(&self, input: NewSupervision) -> Result<Supervision> {
    self
      .call(move |conn| {
        if input.supervisor_role_id == input.student_role_id {
          return Err(
            Error::invariant("a person role cannot supervise itself").into(),
          );
        }
        require_id(conn, "person_roles", EntityKind::PersonRole, input.supervisor_role_id)?;
        require_id(conn, "person_roles", EntityKind::PersonRole, input.student_role_id)?;
        if exists_row(
          conn,
          "SELECT 1 FROM supervisions \
           WHERE supervisor_role_id = ?1 AND student_role_id = ?2",
          rusqlite::params![input.supervisor_role_id, input.student_role_id],
        )? {
          return Err(
            Error::duplicate(format!(
              "person role #{} already supervises person role #{}",
              input.supervisor_role_id, input.student_role_id
            ))
            .into(),
          );
        }
        conn.execute(
          "INSERT INTO supervisions (supervisor_role_id, student_role_id, is_main) \
           VALUES (?1, ?2, ?3)",
          rusqlite::params![
            input.supervisor_role_id,
            input.student_role_id,
            input.is_main,
          ],
        )?;
        Ok(Supervision {
          id:                 conn.last_insert_rowid(),
          supervisor_role_id: input.supervisor_role_id,
          student_role_id:    input.student_role_id,
          is_main:            input.is_main,
        })
      })
      .await
  }

  async fn list_supervisions(
    &self,
    filter: SupervisionFilter,
  ) -> Result<Vec<Supervision>> {
    let now = Utc::now();
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(is_main) = filter.is_main {
          filters.push("s.is_main = ?", is_main);
        }
        if let Some(active) = filter.supervisor_active {
          filters.active("sup.end_date", active, now);
        }
        if let Some(active) = filter.student_active {
          filters.active("st.end_date", active, now);
        }
        if let Some(id) = filter.supervisor_role_id {
          filters.push("s.supervisor_role_id = ?", id);
        }
        if let Some(id) = filter.student_role_id {
          filters.push("s.student_role_id = ?", id);
        }
        if let Some(cohort) = filter.cohort_number {
          filters.push(
            "EXISTS (SELECT 1 FROM phd_students ps \
             WHERE ps.person_role_id = st.id AND ps.cohort_number = ?)",
            cohort,
          );
        }
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["sp.first_name", "sp.last_name"], search);
        }
        let sql = format!(
          "SELECT s.id, s.supervisor_role_id, s.student_role_id, s.is_main \
           FROM supervisions s \
           JOIN person_roles sup ON sup.id = s.supervisor_role_id \
           JOIN person_roles st ON st.id = s.student_role_id \
           JOIN people sp ON sp.id = sup.person_id \
           {} ORDER BY sp.last_name, sp.first_name, s.id",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_supervision,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn remove_supervision(
    &self,
    supervisor_role_id: i64,
    student_role_id: i64,
  ) -> Result<()> {
    self
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM supervisions \
           WHERE supervisor_role_id = ?1 AND student_role_id = ?2",
          rusqlite::params![supervisor_role_id, student_role_id],
        )?;
        if deleted == 0 {
          return Err(
            Error::not_found(EntityKind::Supervision, student_role_id).into(),
          );
        }
        Ok(())
      })
      .await
  }
}

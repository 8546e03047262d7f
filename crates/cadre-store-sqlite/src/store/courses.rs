//! [`CourseStore`] impl: the term sequencer, grad school activities, courses
//! and enrollment.

use rusqlite::OptionalExtension as _;

use cadre_core::{
  course::{
    Course, CoursePatch, Enrollment, EnrollmentPatch, GradSchoolActivity,
    GradSchoolActivityPatch, NewCourse, NewEnrollment, NewGradSchoolActivity,
  },
  error::EntityKind,
  query::{CourseFilter, EnrollmentFilter, GradSchoolActivityFilter, TermFilter},
  store::CourseStore,
  term::{next_term, CourseTerm, CourseTermPatch, Season},
  Error,
};

use super::{exists_row, guard_dependents, require_id, Filters, SqliteStore};
use crate::{
  encode::{
    decode_season, encode_grade, encode_season, season_rank_case,
    RawCourseTerm, RawEnrollment,
  },
  error::{CallResult, Result},
};

const TERM_COLS: &str = "id, season, year, is_active";
const ENROLLMENT_COLS: &str = "id, phd_student_id, course_id, is_completed, grade";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn raw_term(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCourseTerm> {
  Ok(RawCourseTerm {
    id:        row.get(0)?,
    season:    row.get(1)?,
    year:      row.get(2)?,
    is_active: row.get(3)?,
  })
}

fn decode_activity(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<GradSchoolActivity> {
  Ok(GradSchoolActivity {
    id:               row.get(0)?,
    activity_type_id: row.get(1)?,
    description:      row.get(2)?,
    year:             row.get(3)?,
  })
}

fn decode_course(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
  Ok(Course {
    id:                      row.get(0)?,
    title:                   row.get(1)?,
    course_term_id:          row.get(2)?,
    grad_school_activity_id: row.get(3)?,
    credit_points:           row.get(4)?,
    notes:                   row.get(5)?,
  })
}

fn raw_enrollment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEnrollment> {
  Ok(RawEnrollment {
    id:             row.get(0)?,
    phd_student_id: row.get(1)?,
    course_id:      row.get(2)?,
    is_completed:   row.get(3)?,
    grade:          row.get(4)?,
  })
}

// ─── Shared checks ───────────────────────────────────────────────────────────

/// The newest term by the composite (year, season rank) key, if any.
fn latest_term(
  conn: &rusqlite::Connection,
) -> rusqlite::Result<Option<RawCourseTerm>> {
  conn
    .query_row(
      &format!(
        "SELECT {TERM_COLS} FROM course_terms \
         ORDER BY year DESC, {} DESC LIMIT 1",
        season_rank_case("season"),
      ),
      [],
      raw_term,
    )
    .optional()
}

/// (type, description, year) natural key guard; `IS` handles the nullable
/// description and year.
fn check_activity_key_free(
  conn: &rusqlite::Connection,
  activity_type_id: i64,
  description: Option<&str>,
  year: Option<i32>,
  exclude_id: Option<i64>,
) -> CallResult<()> {
  let taken = exists_row(
    conn,
    "SELECT 1 FROM grad_school_activities \
     WHERE activity_type_id = ?1 AND description IS ?2 AND year IS ?3 \
       AND id != ?4",
    rusqlite::params![
      activity_type_id,
      description,
      year,
      exclude_id.unwrap_or(-1),
    ],
  )?;
  if taken {
    Err(
      Error::duplicate(
        "a grad school activity with this type, description and year already \
         exists",
      )
      .into(),
    )
  } else {
    Ok(())
  }
}

/// (title, anchor) duplicate guard across both anchor kinds.
fn check_course_key_free(
  conn: &rusqlite::Connection,
  title: &str,
  course_term_id: Option<i64>,
  grad_school_activity_id: Option<i64>,
  exclude_id: Option<i64>,
) -> CallResult<()> {
  let taken = exists_row(
    conn,
    "SELECT 1 FROM courses \
     WHERE title = ?1 AND course_term_id IS ?2 \
       AND grad_school_activity_id IS ?3 AND id != ?4",
    rusqlite::params![
      title,
      course_term_id,
      grad_school_activity_id,
      exclude_id.unwrap_or(-1),
    ],
  )?;
  if taken {
    Err(
      Error::duplicate(format!(
        "course {title:?} already exists under this anchor"
      ))
      .into(),
    )
  } else {
    Ok(())
  }
}

/// Validate that whichever anchor a course carries actually exists.
fn require_anchor(
  conn: &rusqlite::Connection,
  course_term_id: Option<i64>,
  grad_school_activity_id: Option<i64>,
) -> CallResult<()> {
  if let Some(term_id) = course_term_id {
    require_id(conn, "course_terms", EntityKind::CourseTerm, term_id)?;
  }
  if let Some(activity_id) = grad_school_activity_id {
    require_id(
      conn,
      "grad_school_activities",
      EntityKind::GradSchoolActivity,
      activity_id,
    )?;
  }
  Ok(())
}

// ─── Impl ────────────────────────────────────────────────────────────────────

impl CourseStore for SqliteStore {
  async fn next_course_term(&self) -> Result<CourseTerm> {
    self
      .call(move |conn| {
        let latest = latest_term(conn)?
          .map(|raw| Ok::<_, Error>((decode_season(&raw.season)?, raw.year as i32)))
          .transpose()?;
        let (season, year) = next_term(latest);
        conn.execute(
          "INSERT INTO course_terms (season, year, is_active) VALUES (?1, ?2, 1)",
          rusqlite::params![encode_season(season), year],
        )?;
        Ok(CourseTerm {
          id: conn.last_insert_rowid(),
          season,
          year,
          is_active: true,
        })
      })
      .await
  }

  async fn get_course_term(&self, id: i64) -> Result<Option<CourseTerm>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {TERM_COLS} FROM course_terms WHERE id = ?1"),
            rusqlite::params![id],
            raw_term,
          )
          .optional()?;
        Ok(raw.map(RawCourseTerm::into_course_term).transpose()?)
      })
      .await
  }

  async fn list_course_terms(&self, filter: TermFilter) -> Result<Vec<CourseTerm>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(active) = filter.is_active {
          filters.push("is_active = ?", active);
        }
        let sql = format!(
          "SELECT {TERM_COLS} FROM course_terms {} \
           ORDER BY year DESC, {} DESC",
          filters.clause(),
          season_rank_case("season"),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params_from_iter(filters.into_params()), raw_term)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawCourseTerm::into_course_term)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_course_term(
    &self,
    id: i64,
    patch: CourseTermPatch,
  ) -> Result<CourseTerm> {
    self
      .call(move |conn| {
        let mut term = conn
          .query_row(
            &format!("SELECT {TERM_COLS} FROM course_terms WHERE id = ?1"),
            rusqlite::params![id],
            raw_term,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::CourseTerm, id))?
          .into_course_term()?;

        if let Some(active) = patch.is_active {
          term.is_active = active;
        }
        conn.execute(
          "UPDATE course_terms SET is_active = ?1 WHERE id = ?2",
          rusqlite::params![term.is_active, id],
        )?;
        Ok(term)
      })
      .await
  }

  async fn delete_course_term(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "course_terms", EntityKind::CourseTerm, id)?;
        let latest = latest_term(conn)?;
        if latest.map(|t| t.id) != Some(id) {
          return Err(
            Error::invariant("only the most recent term can be deleted").into(),
          );
        }
        guard_dependents(conn, EntityKind::CourseTerm, id, &[(
          "courses",
          "SELECT 1 FROM courses WHERE course_term_id = ?1 LIMIT 1",
        )])?;
        conn.execute(
          "DELETE FROM course_terms WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  // ── Grad school activities ────────────────────────────────────────────────

  async fn create_grad_school_activity(
    &self,
    input: NewGradSchoolActivity,
  ) -> Result<GradSchoolActivity> {
    self
      .call(move |conn| {
        require_id(
          conn,
          "grad_school_activity_types",
          EntityKind::GradSchoolActivityType,
          input.activity_type_id,
        )?;
        check_activity_key_free(
          conn,
          input.activity_type_id,
          input.description.as_deref(),
          Some(input.year),
          None,
        )?;
        conn.execute(
          "INSERT INTO grad_school_activities \
           (activity_type_id, description, year) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.activity_type_id, input.description, input.year],
        )?;
        Ok(GradSchoolActivity {
          id:               conn.last_insert_rowid(),
          activity_type_id: input.activity_type_id,
          description:      input.description,
          year:             Some(input.year),
        })
      })
      .await
  }

  async fn get_grad_school_activity(
    &self,
    id: i64,
  ) -> Result<Option<GradSchoolActivity>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, activity_type_id, description, year \
               FROM grad_school_activities WHERE id = ?1",
              rusqlite::params![id],
              decode_activity,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_grad_school_activities(
    &self,
    filter: GradSchoolActivityFilter,
  ) -> Result<Vec<GradSchoolActivity>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.activity_type_id {
          filters.push("a.activity_type_id = ?", id);
        }
        if let Some(description) = filter.description {
          filters.push("a.description = ?", description);
        }
        if let Some(year) = filter.year {
          filters.push("a.year = ?", year);
        }
        if let Some(search) = filter.search.as_deref() {
          filters.search(
            &["t.name", "a.description", "CAST(a.year AS TEXT)"],
            search,
          );
        }
        let sql = format!(
          "SELECT a.id, a.activity_type_id, a.description, a.year \
           FROM grad_school_activities a \
           JOIN grad_school_activity_types t ON t.id = a.activity_type_id \
           {} ORDER BY a.year DESC, t.name, a.id",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_activity,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_grad_school_activity(
    &self,
    id: i64,
    patch: GradSchoolActivityPatch,
  ) -> Result<GradSchoolActivity> {
    self
      .call(move |conn| {
        let mut activity = conn
          .query_row(
            "SELECT id, activity_type_id, description, year \
             FROM grad_school_activities WHERE id = ?1",
            rusqlite::params![id],
            decode_activity,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::GradSchoolActivity, id))?;

        if let Some(type_id) = patch.activity_type_id {
          require_id(
            conn,
            "grad_school_activity_types",
            EntityKind::GradSchoolActivityType,
            type_id,
          )?;
          activity.activity_type_id = type_id;
        }
        patch.description.apply(&mut activity.description);
        patch.year.apply(&mut activity.year);
        check_activity_key_free(
          conn,
          activity.activity_type_id,
          activity.description.as_deref(),
          activity.year,
          Some(id),
        )?;

        conn.execute(
          "UPDATE grad_school_activities \
           SET activity_type_id = ?1, description = ?2, year = ?3 WHERE id = ?4",
          rusqlite::params![
            activity.activity_type_id,
            activity.description,
            activity.year,
            id,
          ],
        )?;
        Ok(activity)
      })
      .await
  }

  async fn delete_grad_school_activity(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(
          conn,
          "grad_school_activities",
          EntityKind::GradSchoolActivity,
          id,
        )?;
        guard_dependents(conn, EntityKind::GradSchoolActivity, id, &[
          (
            "courses",
            "SELECT 1 FROM courses WHERE grad_school_activity_id = ?1 LIMIT 1",
          ),
          (
            "student activities",
            "SELECT 1 FROM student_activities \
             WHERE kind = 'grad_school' AND activity_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute(
          "DELETE FROM grad_school_activities WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    self
      .call(move |conn| {
        Course::check_anchor(input.course_term_id, input.grad_school_activity_id)?;
        require_anchor(conn, input.course_term_id, input.grad_school_activity_id)?;
        check_course_key_free(
          conn,
          &input.title,
          input.course_term_id,
          input.grad_school_activity_id,
          None,
        )?;
        conn.execute(
          "INSERT INTO courses \
           (title, course_term_id, grad_school_activity_id, credit_points, notes) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.title,
            input.course_term_id,
            input.grad_school_activity_id,
            input.credit_points,
            input.notes,
          ],
        )?;
        Ok(Course {
          id:                      conn.last_insert_rowid(),
          title:                   input.title,
          course_term_id:          input.course_term_id,
          grad_school_activity_id: input.grad_school_activity_id,
          credit_points:           input.credit_points,
          notes:                   input.notes,
        })
      })
      .await
  }

  async fn get_course(&self, id: i64) -> Result<Option<Course>> {
    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, title, course_term_id, grad_school_activity_id, \
                      credit_points, notes FROM courses WHERE id = ?1",
              rusqlite::params![id],
              decode_course,
            )
            .optional()?,
        )
      })
      .await
  }

  async fn list_courses(&self, filter: CourseFilter) -> Result<Vec<Course>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        let mut limit = "";
        if let Some(title) = filter.title {
          filters.push("c.title = ?", title);
          limit = "LIMIT 1";
        } else if let Some(search) = filter.search.as_deref() {
          filters.search(&["c.title"], search);
        }
        if let Some(id) = filter.course_term_id {
          filters.push("c.course_term_id = ?", id);
        }
        if let Some(id) = filter.grad_school_activity_id {
          filters.push("c.grad_school_activity_id = ?", id);
        }
        if let Some(active) = filter.is_active_term {
          filters.push("t.is_active = ?", active);
        }
        // The composite key resolves the year from whichever anchor the
        // course has; activity-anchored courses rank as season 0.
        let sql = format!(
          "SELECT c.id, c.title, c.course_term_id, c.grad_school_activity_id, \
                  c.credit_points, c.notes \
           FROM courses c \
           LEFT JOIN course_terms t ON t.id = c.course_term_id \
           LEFT JOIN grad_school_activities a ON a.id = c.grad_school_activity_id \
           {} ORDER BY COALESCE(t.year, a.year, 0) DESC, {} DESC, c.id {limit}",
          filters.clause(),
          season_rank_case("t.season"),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            decode_course,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn update_course(&self, id: i64, patch: CoursePatch) -> Result<Course> {
    self
      .call(move |conn| {
        let mut course = conn
          .query_row(
            "SELECT id, title, course_term_id, grad_school_activity_id, \
                    credit_points, notes FROM courses WHERE id = ?1",
            rusqlite::params![id],
            decode_course,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::Course, id))?;

        if let Some(title) = patch.title {
          course.title = title;
        }
        patch.course_term_id.apply(&mut course.course_term_id);
        patch
          .grad_school_activity_id
          .apply(&mut course.grad_school_activity_id);
        patch.credit_points.apply(&mut course.credit_points);
        patch.notes.apply(&mut course.notes);

        Course::check_anchor(course.course_term_id, course.grad_school_activity_id)?;
        require_anchor(conn, course.course_term_id, course.grad_school_activity_id)?;
        check_course_key_free(
          conn,
          &course.title,
          course.course_term_id,
          course.grad_school_activity_id,
          Some(id),
        )?;

        conn.execute(
          "UPDATE courses SET title = ?1, course_term_id = ?2, \
           grad_school_activity_id = ?3, credit_points = ?4, notes = ?5 \
           WHERE id = ?6",
          rusqlite::params![
            course.title,
            course.course_term_id,
            course.grad_school_activity_id,
            course.credit_points,
            course.notes,
            id,
          ],
        )?;
        Ok(course)
      })
      .await
  }

  async fn delete_course(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, id)?;
        guard_dependents(conn, EntityKind::Course, id, &[
          (
            "enrollments",
            "SELECT 1 FROM enrollments WHERE course_id = ?1 LIMIT 1",
          ),
          (
            "teacher links",
            "SELECT 1 FROM course_teachers WHERE course_id = ?1 LIMIT 1",
          ),
          (
            "institution links",
            "SELECT 1 FROM course_institutions WHERE course_id = ?1 LIMIT 1",
          ),
          (
            "decision letters",
            "SELECT 1 FROM decision_letters \
             WHERE parent_kind = 'course' AND parent_id = ?1 LIMIT 1",
          ),
        ])?;
        conn.execute("DELETE FROM courses WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await
  }

  // ── Enrollment ────────────────────────────────────────────────────────────

  async fn enroll_student(
    &self,
    course_id: i64,
    input: NewEnrollment,
  ) -> Result<Enrollment> {
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, course_id)?;
        require_id(
          conn,
          "phd_students",
          EntityKind::PhdStudent,
          input.phd_student_id,
        )?;
        if exists_row(
          conn,
          "SELECT 1 FROM enrollments WHERE phd_student_id = ?1 AND course_id = ?2",
          rusqlite::params![input.phd_student_id, course_id],
        )? {
          return Err(
            Error::duplicate(format!(
              "PhD student #{} is already enrolled in course #{course_id}",
              input.phd_student_id
            ))
            .into(),
          );
        }
        conn.execute(
          "INSERT INTO enrollments \
           (phd_student_id, course_id, is_completed, grade) \
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.phd_student_id,
            course_id,
            input.is_completed,
            input.grade.map(encode_grade),
          ],
        )?;
        Ok(Enrollment {
          id: conn.last_insert_rowid(),
          phd_student_id: input.phd_student_id,
          course_id,
          is_completed: input.is_completed,
          grade: input.grade,
        })
      })
      .await
  }

  async fn list_course_enrollments(
    &self,
    course_id: i64,
    filter: EnrollmentFilter,
  ) -> Result<Vec<Enrollment>> {
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, course_id)?;
        let mut filters = Filters::new();
        filters.push("e.course_id = ?", course_id);
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.first_name", "p.last_name"], search);
        }
        let sql = format!(
          "SELECT e.id, e.phd_student_id, e.course_id, e.is_completed, e.grade \
           FROM enrollments e \
           JOIN phd_students s ON s.id = e.phd_student_id \
           JOIN person_roles pr ON pr.id = s.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           {} ORDER BY p.last_name, p.first_name",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            raw_enrollment,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawEnrollment::into_enrollment)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn list_student_enrollments(
    &self,
    phd_student_id: i64,
  ) -> Result<Vec<Enrollment>> {
    self
      .call(move |conn| {
        require_id(conn, "phd_students", EntityKind::PhdStudent, phd_student_id)?;
        // Open course work first, then newest by the course's composite key.
        let sql = format!(
          "SELECT e.id, e.phd_student_id, e.course_id, e.is_completed, e.grade \
           FROM enrollments e \
           JOIN courses c ON c.id = e.course_id \
           LEFT JOIN course_terms t ON t.id = c.course_term_id \
           LEFT JOIN grad_school_activities a ON a.id = c.grad_school_activity_id \
           WHERE e.phd_student_id = ?1 \
           ORDER BY e.is_completed ASC, COALESCE(t.year, a.year, 0) DESC, \
                    {} DESC, e.id",
          season_rank_case("t.season"),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params![phd_student_id], raw_enrollment)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawEnrollment::into_enrollment)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_enrollment(
    &self,
    course_id: i64,
    phd_student_id: i64,
    patch: EnrollmentPatch,
  ) -> Result<Enrollment> {
    self
      .call(move |conn| {
        let mut enrollment = conn
          .query_row(
            &format!(
              "SELECT {ENROLLMENT_COLS} FROM enrollments \
               WHERE course_id = ?1 AND phd_student_id = ?2"
            ),
            rusqlite::params![course_id, phd_student_id],
            raw_enrollment,
          )
          .optional()?
          .ok_or_else(|| {
            Error::not_found(EntityKind::Enrollment, phd_student_id)
          })?
          .into_enrollment()?;

        if let Some(completed) = patch.is_completed {
          enrollment.is_completed = completed;
        }
        patch.grade.apply(&mut enrollment.grade);

        conn.execute(
          "UPDATE enrollments SET is_completed = ?1, grade = ?2 WHERE id = ?3",
          rusqlite::params![
            enrollment.is_completed,
            enrollment.grade.map(encode_grade),
            enrollment.id,
          ],
        )?;
        Ok(enrollment)
      })
      .await
  }

  async fn withdraw_student(
    &self,
    course_id: i64,
    phd_student_id: i64,
  ) -> Result<()> {
    self
      .call(move |conn| {
        require_id(conn, "courses", EntityKind::Course, course_id)?;
        require_id(conn, "phd_students", EntityKind::PhdStudent, phd_student_id)?;
        let deleted = conn.execute(
          "DELETE FROM enrollments WHERE course_id = ?1 AND phd_student_id = ?2",
          rusqlite::params![course_id, phd_student_id],
        )?;
        if deleted == 0 {
          return Err(
            Error::not_found(EntityKind::Enrollment, phd_student_id).into(),
          );
        }
        Ok(())
      })
      .await
  }
}

//! [`ActivityStore`] impl.
//!
//! Both variants share one table keyed by (`phd_student_id`, `kind`,
//! `activity_id`). The abroad variant has no external activity to reference,
//! so its `activity_id` is back-filled with the new row's own id inside the
//! insert transaction, keeping the natural key total.

use rusqlite::OptionalExtension as _;

use cadre_core::{
  activity::{
    ActivityDetail, ActivityPatch, GradSchoolDetail, NewStudentActivity,
    StudentActivity,
  },
  error::EntityKind,
  query::ActivityFilter,
  store::ActivityStore,
  Error,
};

use super::{exists_row, require_id, Filters, SqliteStore};
use crate::{encode::RawActivity, error::Result};

fn raw_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawActivity> {
  Ok(RawActivity {
    id:             row.get(0)?,
    phd_student_id: row.get(1)?,
    kind:           row.get(2)?,
    activity_id:    row.get(3)?,
    detail_json:    row.get(4)?,
  })
}

impl ActivityStore for SqliteStore {
  async fn create_student_activity(
    &self,
    phd_student_id: i64,
    input: NewStudentActivity,
  ) -> Result<StudentActivity> {
    self
      .call(move |conn| {
        require_id(conn, "phd_students", EntityKind::PhdStudent, phd_student_id)?;
        match input {
          NewStudentActivity::GradSchool {
            grad_school_activity_id,
            is_completed,
            grade,
          } => {
            require_id(
              conn,
              "grad_school_activities",
              EntityKind::GradSchoolActivity,
              grad_school_activity_id,
            )?;
            if exists_row(
              conn,
              "SELECT 1 FROM student_activities \
               WHERE phd_student_id = ?1 AND kind = 'grad_school' \
                 AND activity_id = ?2",
              rusqlite::params![phd_student_id, grad_school_activity_id],
            )? {
              return Err(
                Error::duplicate(format!(
                  "PhD student #{phd_student_id} is already registered for \
                   grad school activity #{grad_school_activity_id}"
                ))
                .into(),
              );
            }
            let detail = ActivityDetail::GradSchool(GradSchoolDetail {
              is_completed,
              grade,
            });
            conn.execute(
              "INSERT INTO student_activities \
               (phd_student_id, kind, activity_id, detail_json) \
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![
                phd_student_id,
                detail.discriminant(),
                grad_school_activity_id,
                detail.to_json()?.to_string(),
              ],
            )?;
            Ok(StudentActivity {
              id: conn.last_insert_rowid(),
              phd_student_id,
              activity_id: grad_school_activity_id,
              detail,
            })
          }
          NewStudentActivity::Abroad(abroad) => {
            let detail = ActivityDetail::Abroad(abroad);
            let tx = conn.transaction()?;
            tx.execute(
              "INSERT INTO student_activities \
               (phd_student_id, kind, activity_id, detail_json) \
               VALUES (?1, ?2, NULL, ?3)",
              rusqlite::params![
                phd_student_id,
                detail.discriminant(),
                detail.to_json()?.to_string(),
              ],
            )?;
            let id = tx.last_insert_rowid();
            // Back-fill the natural key with the row's own id.
            tx.execute(
              "UPDATE student_activities SET activity_id = ?1 WHERE id = ?1",
              rusqlite::params![id],
            )?;
            tx.commit()?;
            Ok(StudentActivity {
              id,
              phd_student_id,
              activity_id: id,
              detail,
            })
          }
        }
      })
      .await
  }

  async fn get_student_activity(&self, id: i64) -> Result<Option<StudentActivity>> {
    self
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT id, phd_student_id, kind, activity_id, detail_json \
             FROM student_activities WHERE id = ?1",
            rusqlite::params![id],
            raw_activity,
          )
          .optional()?;
        Ok(raw.map(RawActivity::into_activity).transpose()?)
      })
      .await
  }

  async fn list_student_activities(
    &self,
    filter: ActivityFilter,
  ) -> Result<Vec<StudentActivity>> {
    self
      .call(move |conn| {
        let mut filters = Filters::new();
        if let Some(id) = filter.phd_student_id {
          filters.push("a.phd_student_id = ?", id);
        }
        if let Some(id) = filter.grad_school_activity_id {
          filters.push("(a.kind = 'grad_school' AND a.activity_id = ?)", id);
        }
        if let Some(search) = filter.search.as_deref() {
          filters.search(&["p.first_name", "p.last_name"], search);
        }
        let sql = format!(
          "SELECT a.id, a.phd_student_id, a.kind, a.activity_id, a.detail_json \
           FROM student_activities a \
           JOIN phd_students s ON s.id = a.phd_student_id \
           JOIN person_roles pr ON pr.id = s.person_role_id \
           JOIN people p ON p.id = pr.person_id \
           {} ORDER BY a.id",
          filters.clause(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(
            rusqlite::params_from_iter(filters.into_params()),
            raw_activity,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(
          raws
            .into_iter()
            .map(RawActivity::into_activity)
            .collect::<Result<Vec<_>>>()?,
        )
      })
      .await
  }

  async fn update_student_activity(
    &self,
    id: i64,
    patch: ActivityPatch,
  ) -> Result<StudentActivity> {
    self
      .call(move |conn| {
        let mut activity = conn
          .query_row(
            "SELECT id, phd_student_id, kind, activity_id, detail_json \
             FROM student_activities WHERE id = ?1",
            rusqlite::params![id],
            raw_activity,
          )
          .optional()?
          .ok_or_else(|| Error::not_found(EntityKind::StudentActivity, id))?
          .into_activity()?;

        // The patch kind must match the stored row; a payload is never
        // re-interpreted as the other variant.
        match (&mut activity.detail, patch) {
          (
            ActivityDetail::GradSchool(detail),
            ActivityPatch::GradSchool(patch),
          ) => {
            if let Some(completed) = patch.is_completed {
              detail.is_completed = completed;
            }
            patch.grade.apply(&mut detail.grade);
          }
          (ActivityDetail::Abroad(detail), ActivityPatch::Abroad(patch)) => {
            patch.description.apply(&mut detail.description);
            patch.start_date.apply(&mut detail.start_date);
            patch.end_date.apply(&mut detail.end_date);
            patch.city.apply(&mut detail.city);
            patch.country.apply(&mut detail.country);
            patch.host_institution.apply(&mut detail.host_institution);
          }
          (stored, patch) => {
            return Err(
              Error::invariant(format!(
                "student activity #{id} is a {} activity, not {}",
                stored.discriminant(),
                patch.discriminant(),
              ))
              .into(),
            );
          }
        }

        conn.execute(
          "UPDATE student_activities SET detail_json = ?1 WHERE id = ?2",
          rusqlite::params![activity.detail.to_json()?.to_string(), id],
        )?;
        Ok(activity)
      })
      .await
  }

  async fn delete_student_activity(&self, id: i64) -> Result<()> {
    self
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM student_activities WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if deleted == 0 {
          return Err(Error::not_found(EntityKind::StudentActivity, id).into());
        }
        Ok(())
      })
      .await
  }
}

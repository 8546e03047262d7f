//! Courses, their temporal anchors, and student enrollment.

use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  patch::Patch,
};

// ─── Grad school activities ──────────────────────────────────────────────────

/// An activity of the graduate school (a summer school, a retreat, …) that
/// can anchor courses in time as an alternative to a regular term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradSchoolActivity {
  pub id:               i64,
  pub activity_type_id: i64,
  pub description:      Option<String>,
  /// Nullable for legacy rows only; creation always requires one.
  pub year:             Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGradSchoolActivity {
  pub activity_type_id: i64,
  pub description:      Option<String>,
  pub year:             i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradSchoolActivityPatch {
  pub activity_type_id: Option<i64>,
  pub description:      Patch<String>,
  pub year:             Patch<i32>,
}

// ─── Courses ─────────────────────────────────────────────────────────────────

/// A course offered by the programme.
///
/// Exactly one of `course_term_id` / `grad_school_activity_id` is set; the
/// pair is the course's temporal anchor. The store declares a CHECK
/// constraint for the XOR, and [`Course::check_anchor`] rejects violations
/// before they reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub id:                      i64,
  pub title:                   String,
  pub course_term_id:          Option<i64>,
  pub grad_school_activity_id: Option<i64>,
  pub credit_points:           Option<f64>,
  pub notes:                   Option<String>,
}

impl Course {
  pub fn check_anchor(
    course_term_id: Option<i64>,
    grad_school_activity_id: Option<i64>,
  ) -> Result<()> {
    match (course_term_id, grad_school_activity_id) {
      (Some(_), None) | (None, Some(_)) => Ok(()),
      (Some(_), Some(_)) => Err(Error::invariant(
        "course cannot reference both a term and a grad school activity",
      )),
      (None, None) => Err(Error::invariant(
        "course must reference either a term or a grad school activity",
      )),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
  pub title:                   String,
  pub course_term_id:          Option<i64>,
  pub grad_school_activity_id: Option<i64>,
  pub credit_points:           Option<f64>,
  pub notes:                   Option<String>,
}

/// Switching anchors takes a `Set` on one side and an explicit `Clear` on
/// the other; the combined result must still satisfy the XOR.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoursePatch {
  pub title:                   Option<String>,
  pub course_term_id:          Patch<i64>,
  pub grad_school_activity_id: Patch<i64>,
  pub credit_points:           Patch<f64>,
  pub notes:                   Patch<String>,
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// Pass/fail grade for completed course work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
  Pass,
  Fail,
}

/// A PhD student's link to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub id:             i64,
  pub phd_student_id: i64,
  pub course_id:      i64,
  pub is_completed:   bool,
  pub grade:          Option<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEnrollment {
  pub phd_student_id: i64,
  #[serde(default)]
  pub is_completed:   bool,
  pub grade:          Option<Grade>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrollmentPatch {
  pub is_completed: Option<bool>,
  pub grade:        Patch<Grade>,
}

#[cfg(test)]
mod tests {
  use super::Course;

  #[test]
  fn anchor_xor() {
    assert!(Course::check_anchor(Some(1), None).is_ok());
    assert!(Course::check_anchor(None, Some(1)).is_ok());
    assert!(Course::check_anchor(Some(1), Some(2)).is_err());
    assert!(Course::check_anchor(None, None).is_err());
  }
}

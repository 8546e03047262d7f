//! Filter parameter structs consumed by the listing operations.
//!
//! Every filter field is independent and optional; a listing ANDs all the
//! filters it is given, while a `search` value ORs its substring match over
//! the columns named on the field. `name` fields are exact-match lookups,
//! used by callers checking for duplicates before an insert.

use serde::Deserialize;

use crate::{person::RoleKind, project::ProjectStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonFilter {
  /// Substring over first name, last name or email.
  pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonRoleFilter {
  pub person_id: Option<i64>,
  pub kind:      Option<RoleKind>,
  /// Derived status; filters on the end-date predicate, not a column.
  pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResearcherFilter {
  pub person_role_id: Option<i64>,
  pub is_active:      Option<bool>,
  pub title_id:       Option<i64>,
  pub institution_id: Option<i64>,
  pub field_id:       Option<i64>,
  pub branch_id:      Option<i64>,
  /// Substring over the person's name or email.
  pub search:         Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhdStudentFilter {
  pub person_role_id: Option<i64>,
  pub is_active:      Option<bool>,
  pub cohort_number:  Option<i64>,
  pub is_affiliated:  Option<bool>,
  pub is_graduated:   Option<bool>,
  pub institution_id: Option<i64>,
  pub field_id:       Option<i64>,
  pub branch_id:      Option<i64>,
  pub search:         Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostdocFilter {
  pub person_role_id: Option<i64>,
  pub is_active:      Option<bool>,
  pub cohort_number:  Option<i64>,
  pub is_incoming:    Option<bool>,
  pub is_graduated:   Option<bool>,
  pub institution_id: Option<i64>,
  pub field_id:       Option<i64>,
  pub branch_id:      Option<i64>,
  pub search:         Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LookupFilter {
  /// Exact-match duplicate-prevention lookup; wins over `search`.
  pub name:   Option<String>,
  pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldFilter {
  pub name:      Option<String>,
  pub branch_id: Option<i64>,
  pub search:    Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TermFilter {
  /// The stored admin flag, not a date derivation.
  pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradSchoolActivityFilter {
  pub activity_type_id: Option<i64>,
  pub description:      Option<String>,
  pub year:             Option<i32>,
  /// Substring over type name, description, or year rendered as text.
  pub search:           Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourseFilter {
  /// Exact-match duplicate-prevention lookup.
  pub title:                   Option<String>,
  pub course_term_id:          Option<i64>,
  pub grad_school_activity_id: Option<i64>,
  /// Restricts to term-anchored courses whose term has the given flag.
  pub is_active_term:          Option<bool>,
  pub search:                  Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityFilter {
  pub phd_student_id:          Option<i64>,
  pub grad_school_activity_id: Option<i64>,
  /// Substring over the student's name.
  pub search:                  Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectFilter {
  pub call_type_id:           Option<i64>,
  pub title:                  Option<String>,
  pub project_number:         Option<String>,
  pub final_report_submitted: Option<bool>,
  pub is_extended:            Option<bool>,
  /// Derived status; see [`ProjectStatus::derive`].
  pub status:                 Option<ProjectStatus>,
  pub field_id:               Option<i64>,
  pub branch_id:              Option<i64>,
  /// Substring over title or project number.
  pub search:                 Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SupervisionFilter {
  pub is_main:            Option<bool>,
  pub supervisor_active:  Option<bool>,
  pub student_active:     Option<bool>,
  pub supervisor_role_id: Option<i64>,
  pub student_role_id:    Option<i64>,
  /// Cohort number of the supervised student's detail record.
  pub cohort_number:      Option<i64>,
  /// Substring over the supervisor's name.
  pub search:             Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrollmentFilter {
  /// Substring over the enrolled student's name.
  pub search: Option<String>,
}

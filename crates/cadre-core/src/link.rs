//! Relationship records between entities.
//!
//! Four link tables carry no columns beyond the pair itself and share one
//! kind-dispatched attach/detach surface. The richer links (enrollments,
//! project membership, affiliations, supervisions) have typed operations of
//! their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EntityKind;

/// A link table whose rows are bare (parent, child) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairLink {
  CourseInstitution,
  CourseTeacher,
  ProjectField,
  RoleField,
}

impl PairLink {
  /// (parent, child) entity kinds, for existence checks and error context.
  pub fn ends(self) -> (EntityKind, EntityKind) {
    match self {
      Self::CourseInstitution => (EntityKind::Course, EntityKind::Institution),
      Self::CourseTeacher => (EntityKind::Course, EntityKind::PersonRole),
      Self::ProjectField => (EntityKind::Project, EntityKind::Field),
      Self::RoleField => (EntityKind::PersonRole, EntityKind::Field),
    }
  }
}

// ─── Affiliations ────────────────────────────────────────────────────────────

/// A person-role's stint at an institution. Repeat stints with different
/// date ranges are allowed; only the date order is constrained.
///
/// `is_active` is derived from `end_date` at load time and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
  pub id:             i64,
  pub person_role_id: i64,
  pub institution_id: i64,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
  pub is_active:      bool,
}

/// The person-role comes from the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAffiliation {
  pub institution_id: i64,
  pub start_date:     Option<DateTime<Utc>>,
  pub end_date:       Option<DateTime<Utc>>,
}

// ─── Supervisions ────────────────────────────────────────────────────────────

/// Supervisor/student pairing between two person-roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supervision {
  pub id:                 i64,
  pub supervisor_role_id: i64,
  pub student_role_id:    i64,
  pub is_main:            bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupervision {
  pub supervisor_role_id: i64,
  pub student_role_id:    i64,
  #[serde(default)]
  pub is_main:            bool,
}

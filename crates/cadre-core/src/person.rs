//! People, their programme roles, and the per-role detail records.
//!
//! A person is a thin identity record. Everything programme-specific hangs
//! off a [`PersonRole`]: the same person can be a PhD student and later a
//! postdoc, each engagement with its own dates, links and detail record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::Patch;

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
}

impl Person {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonPatch {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub email:      Option<String>,
}

// ─── Roles ───────────────────────────────────────────────────────────────────

/// The programme role a person-role record represents. Stored as a TEXT
/// discriminant; there is no lookup table behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
  Researcher,
  PhdStudent,
  Postdoc,
}

/// A person's engagement in the programme under one role kind.
///
/// `is_active` is derived from `end_date` at load time and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRole {
  pub id:         i64,
  pub person_id:  i64,
  pub kind:       RoleKind,
  pub start_date: DateTime<Utc>,
  pub end_date:   Option<DateTime<Utc>>,
  pub notes:      Option<String>,
  pub is_active:  bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonRole {
  pub person_id:  i64,
  pub kind:       RoleKind,
  /// Defaults to the moment of creation when omitted.
  pub start_date: Option<DateTime<Utc>>,
  pub end_date:   Option<DateTime<Utc>>,
  pub notes:      Option<String>,
}

/// The person and kind of a role are fixed at creation; only the engagement
/// window and notes can change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonRolePatch {
  pub start_date: Option<DateTime<Utc>>,
  pub end_date:   Patch<DateTime<Utc>>,
  pub notes:      Patch<String>,
}

// ─── Researcher detail ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Researcher {
  pub id:                i64,
  pub person_role_id:    i64,
  pub title_id:          Option<i64>,
  /// Title held when first joining, kept when the current title changes.
  pub original_title_id: Option<i64>,
  pub link:              Option<String>,
  pub notes:             Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResearcher {
  pub person_role_id:    i64,
  pub title_id:          Option<i64>,
  pub original_title_id: Option<i64>,
  pub link:              Option<String>,
  pub notes:             Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResearcherPatch {
  pub title_id:          Patch<i64>,
  pub original_title_id: Patch<i64>,
  pub link:              Patch<String>,
  pub notes:             Patch<String>,
}

// ─── PhD student detail ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhdStudent {
  pub id:                   i64,
  pub person_role_id:       i64,
  pub cohort_number:        Option<i64>,
  pub is_affiliated:        bool,
  pub department:           Option<String>,
  pub discipline:           Option<String>,
  pub project_title:        Option<String>,
  pub planned_defense_date: Option<DateTime<Utc>>,
  pub is_graduated:         bool,
  /// Free-text whereabouts after graduation.
  pub current_title:        Option<String>,
  pub current_organization: Option<String>,
  pub link:                 Option<String>,
  pub notes:                Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhdStudent {
  pub person_role_id:       i64,
  pub cohort_number:        Option<i64>,
  #[serde(default)]
  pub is_affiliated:        bool,
  pub department:           Option<String>,
  pub discipline:           Option<String>,
  pub project_title:        Option<String>,
  pub planned_defense_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub is_graduated:         bool,
  pub current_title:        Option<String>,
  pub current_organization: Option<String>,
  pub link:                 Option<String>,
  pub notes:                Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhdStudentPatch {
  pub cohort_number:        Patch<i64>,
  pub is_affiliated:        Option<bool>,
  pub department:           Patch<String>,
  pub discipline:           Patch<String>,
  pub project_title:        Patch<String>,
  pub planned_defense_date: Patch<DateTime<Utc>>,
  pub is_graduated:         Option<bool>,
  pub current_title:        Patch<String>,
  pub current_organization: Patch<String>,
  pub link:                 Patch<String>,
  pub notes:                Patch<String>,
}

// ─── Postdoc detail ──────────────────────────────────────────────────────────

/// Postdoc whereabouts use known-or-other pairs: a catalog reference when
/// the title/institution is on file, a free-text fallback when it is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Postdoc {
  pub id:                        i64,
  pub person_role_id:            i64,
  pub cohort_number:             Option<i64>,
  pub department:                Option<String>,
  pub discipline:                Option<String>,
  pub project_title:             Option<String>,
  pub is_incoming:               bool,
  pub is_graduated:              bool,
  pub current_title_id:          Option<i64>,
  pub current_title_other:       Option<String>,
  pub current_institution_id:    Option<i64>,
  pub current_institution_other: Option<String>,
  pub link:                      Option<String>,
  pub notes:                     Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostdoc {
  pub person_role_id:            i64,
  pub cohort_number:             Option<i64>,
  pub department:                Option<String>,
  pub discipline:                Option<String>,
  pub project_title:             Option<String>,
  #[serde(default)]
  pub is_incoming:               bool,
  #[serde(default)]
  pub is_graduated:              bool,
  pub current_title_id:          Option<i64>,
  pub current_title_other:       Option<String>,
  pub current_institution_id:    Option<i64>,
  pub current_institution_other: Option<String>,
  pub link:                      Option<String>,
  pub notes:                     Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostdocPatch {
  pub cohort_number:             Patch<i64>,
  pub department:                Patch<String>,
  pub discipline:                Patch<String>,
  pub project_title:             Patch<String>,
  pub is_incoming:               Option<bool>,
  pub is_graduated:              Option<bool>,
  pub current_title_id:          Patch<i64>,
  pub current_title_other:       Patch<String>,
  pub current_institution_id:    Patch<i64>,
  pub current_institution_other: Patch<String>,
  pub link:                      Patch<String>,
  pub notes:                     Patch<String>,
}

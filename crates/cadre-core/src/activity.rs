//! Student activities: one base record with mutually exclusive variants.
//!
//! Every activity row carries the triple (`phd_student_id`, `kind`,
//! `activity_id`) plus a per-variant payload stored as JSON. For the
//! grad-school variant `activity_id` references a
//! [`GradSchoolActivity`](crate::course::GradSchoolActivity); for the
//! abroad variant it is back-filled with the row's own id, keeping the
//! uniqueness triple well-defined across both variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  course::Grade,
  error::Result,
  patch::Patch,
};

// ─── Variant payloads ────────────────────────────────────────────────────────

// `deny_unknown_fields` keeps the two payload shapes from decoding as one
// another: with every field optional, a grad-school payload would otherwise
// parse as an empty abroad payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradSchoolDetail {
  #[serde(default)]
  pub is_completed: bool,
  pub grade:        Option<Grade>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbroadDetail {
  pub description:      Option<String>,
  pub start_date:       Option<DateTime<Utc>>,
  pub end_date:         Option<DateTime<Utc>>,
  pub city:             Option<String>,
  pub country:          Option<String>,
  pub host_institution: Option<String>,
}

/// The typed payload of a student activity. The variant name serves as the
/// `kind` discriminant stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ActivityDetail {
  GradSchool(GradSchoolDetail),
  Abroad(AbroadDetail),
}

impl ActivityDetail {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::GradSchool(_) => "grad_school",
      Self::Abroad(_) => "abroad",
    }
  }

  /// Serialise the inner payload (without the kind tag) for the
  /// `detail_json` database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Deserialise from the discriminant string and JSON payload stored in
  /// the database.
  pub fn from_parts(
    discriminant: &str,
    data: serde_json::Value,
  ) -> Result<Self> {
    let wrapped = serde_json::json!({ "kind": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

// ─── Activity record ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentActivity {
  pub id:             i64,
  pub phd_student_id: i64,
  /// Completes the (student, kind, activity) natural key; see module docs.
  pub activity_id:    i64,
  #[serde(flatten)]
  pub detail:         ActivityDetail,
}

/// Create payload. The grad-school variant names the activity it enrolls
/// the student in; the abroad variant is self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NewStudentActivity {
  GradSchool {
    grad_school_activity_id: i64,
    #[serde(default)]
    is_completed:            bool,
    grade:                   Option<Grade>,
  },
  Abroad(AbroadDetail),
}

impl NewStudentActivity {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::GradSchool { .. } => "grad_school",
      Self::Abroad(_) => "abroad",
    }
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradSchoolPatch {
  pub is_completed: Option<bool>,
  pub grade:        Patch<Grade>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AbroadPatch {
  pub description:      Patch<String>,
  pub start_date:       Patch<DateTime<Utc>>,
  pub end_date:         Patch<DateTime<Utc>>,
  pub city:             Patch<String>,
  pub country:          Patch<String>,
  pub host_institution: Patch<String>,
}

/// Update payload. The kind must match the stored row's kind; the store
/// rejects a mismatch rather than silently re-interpreting the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ActivityPatch {
  GradSchool(GradSchoolPatch),
  Abroad(AbroadPatch),
}

impl ActivityPatch {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::GradSchool(_) => "grad_school",
      Self::Abroad(_) => "abroad",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detail_round_trips_through_parts() {
    let detail = ActivityDetail::Abroad(AbroadDetail {
      description: Some("exchange semester".into()),
      city: Some("Uppsala".into()),
      country: Some("Sweden".into()),
      ..AbroadDetail::default()
    });
    let json = detail.to_json().unwrap();
    let back = ActivityDetail::from_parts("abroad", json).unwrap();
    assert_eq!(back, detail);
  }

  #[test]
  fn mismatched_discriminant_fails_decode() {
    let detail = ActivityDetail::GradSchool(GradSchoolDetail {
      is_completed: true,
      grade: Some(Grade::Pass),
    });
    let json = detail.to_json().unwrap();
    // Grad-school payloads do not parse as abroad payloads.
    assert!(ActivityDetail::from_parts("abroad", json).is_err());
  }
}

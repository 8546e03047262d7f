//! Projects, their membership, and output reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{patch::Patch, temporal};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Derived three-way project lifecycle status; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
  Ongoing,
  AwaitingReport,
  Completed,
}

impl ProjectStatus {
  /// A project without an end date (or whose end date has not passed) is
  /// ongoing; an ended project is completed once its final report is in
  /// and awaiting that report until then.
  pub fn derive(
    end_date: Option<DateTime<Utc>>,
    final_report_submitted: bool,
    now: DateTime<Utc>,
  ) -> Self {
    if temporal::is_active_at(end_date, now) {
      ProjectStatus::Ongoing
    } else if final_report_submitted {
      ProjectStatus::Completed
    } else {
      ProjectStatus::AwaitingReport
    }
  }
}

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub id:                     i64,
  pub call_type_id:           i64,
  pub title:                  String,
  pub project_number:         String,
  pub final_report_submitted: bool,
  pub is_extended:            bool,
  pub start_date:             Option<DateTime<Utc>>,
  pub end_date:               Option<DateTime<Utc>>,
  pub notes:                  Option<String>,
  /// Derived at load time from `end_date` and `final_report_submitted`.
  pub status:                 ProjectStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
  pub call_type_id:           i64,
  pub title:                  String,
  pub project_number:         String,
  #[serde(default)]
  pub final_report_submitted: bool,
  #[serde(default)]
  pub is_extended:            bool,
  pub start_date:             Option<DateTime<Utc>>,
  pub end_date:               Option<DateTime<Utc>>,
  pub notes:                  Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
  pub call_type_id:           Option<i64>,
  pub title:                  Option<String>,
  pub project_number:         Option<String>,
  pub final_report_submitted: Option<bool>,
  pub is_extended:            Option<bool>,
  pub start_date:             Patch<DateTime<Utc>>,
  pub end_date:               Patch<DateTime<Utc>>,
  pub notes:                  Patch<String>,
}

// ─── Membership ──────────────────────────────────────────────────────────────

/// A person-role's membership in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
  pub id:                        i64,
  pub project_id:                i64,
  pub person_role_id:            i64,
  pub is_principal_investigator: bool,
  pub is_contact_person:         bool,
  /// Stored flag, toggled by admins; not derived from dates.
  pub is_active:                 bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectMember {
  pub person_role_id:            i64,
  #[serde(default)]
  pub is_principal_investigator: bool,
  #[serde(default)]
  pub is_contact_person:         bool,
  #[serde(default = "default_true")]
  pub is_active:                 bool,
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectMemberPatch {
  pub is_principal_investigator: Option<bool>,
  pub is_contact_person:         Option<bool>,
  pub is_active:                 Option<bool>,
}

// ─── Output reports ──────────────────────────────────────────────────────────

/// A link to a research output report filed for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutputReport {
  pub id:         i64,
  pub project_id: i64,
  pub link:       String,
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::ProjectStatus;

  #[test]
  fn status_derivation() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let past = now - Duration::days(30);
    let future = now + Duration::days(30);

    assert_eq!(ProjectStatus::derive(None, false, now), ProjectStatus::Ongoing);
    assert_eq!(
      ProjectStatus::derive(Some(future), false, now),
      ProjectStatus::Ongoing
    );
    assert_eq!(
      ProjectStatus::derive(Some(past), false, now),
      ProjectStatus::AwaitingReport
    );
    assert_eq!(
      ProjectStatus::derive(Some(past), true, now),
      ProjectStatus::Completed
    );
  }
}

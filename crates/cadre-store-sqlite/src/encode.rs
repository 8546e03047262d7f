//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings; timezone-naive values
//! inherited from imported data decode as UTC, so every comparison downstream
//! is aware-to-aware. Enum discriminants are stored as the same snake_case
//! strings their serde representations use. Variant payloads are compact
//! JSON.

use chrono::{DateTime, NaiveDateTime, Utc};

use cadre_core::{
  activity::{ActivityDetail, StudentActivity},
  course::{Enrollment, Grade},
  letter::{DecisionLetter, LetterParent},
  link::Affiliation,
  person::{PersonRole, PhdStudent, Postdoc, RoleKind},
  project::{Project, ProjectStatus},
  temporal,
  term::{CourseTerm, Season},
  Error,
};

use crate::error::Result;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

/// Decode a stored timestamp. Naive strings (no offset) are normalised to
/// UTC rather than rejected; legacy imports wrote them.
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    .map(|naive| naive.and_utc())
    .map_err(|_| Error::Store(format!("unparseable timestamp: {s:?}")))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Season ──────────────────────────────────────────────────────────────────

pub fn encode_season(s: Season) -> &'static str {
  match s {
    Season::Spring => "spring",
    Season::Summer => "summer",
    Season::Fall => "fall",
    Season::Winter => "winter",
  }
}

pub fn decode_season(s: &str) -> Result<Season> {
  match s {
    "spring" => Ok(Season::Spring),
    "summer" => Ok(Season::Summer),
    "fall" => Ok(Season::Fall),
    "winter" => Ok(Season::Winter),
    other => Err(Error::UnknownDiscriminant("season", other.to_owned())),
  }
}

/// SQL `CASE` expression mapping a season column to its sort rank, generated
/// from [`Season::rank`] so SQL ordering and Rust ordering cannot drift
/// apart.
pub fn season_rank_case(column: &str) -> String {
  let arms = Season::ALL
    .iter()
    .map(|s| format!("WHEN '{}' THEN {}", encode_season(*s), s.rank()))
    .collect::<Vec<_>>()
    .join(" ");
  // ELSE 0: a course anchored to a grad school activity has no season.
  format!("CASE {column} {arms} ELSE 0 END")
}

// ─── RoleKind ────────────────────────────────────────────────────────────────

pub fn encode_role_kind(k: RoleKind) -> &'static str {
  match k {
    RoleKind::Researcher => "researcher",
    RoleKind::PhdStudent => "phd_student",
    RoleKind::Postdoc => "postdoc",
  }
}

pub fn decode_role_kind(s: &str) -> Result<RoleKind> {
  match s {
    "researcher" => Ok(RoleKind::Researcher),
    "phd_student" => Ok(RoleKind::PhdStudent),
    "postdoc" => Ok(RoleKind::Postdoc),
    other => Err(Error::UnknownDiscriminant("role kind", other.to_owned())),
  }
}

// ─── Grade ───────────────────────────────────────────────────────────────────

pub fn encode_grade(g: Grade) -> &'static str {
  match g {
    Grade::Pass => "pass",
    Grade::Fail => "fail",
  }
}

pub fn decode_grade(s: &str) -> Result<Grade> {
  match s {
    "pass" => Ok(Grade::Pass),
    "fail" => Ok(Grade::Fail),
    other => Err(Error::UnknownDiscriminant("grade", other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `person_roles` row.
pub struct RawPersonRole {
  pub id:         i64,
  pub person_id:  i64,
  pub kind:       String,
  pub start_date: String,
  pub end_date:   Option<String>,
  pub notes:      Option<String>,
}

impl RawPersonRole {
  /// `now` drives the derived `is_active`; it is captured once per
  /// operation so every row in a listing is judged against the same day.
  pub fn into_person_role(self, now: DateTime<Utc>) -> Result<PersonRole> {
    let end_date = decode_opt_dt(self.end_date.as_deref())?;
    Ok(PersonRole {
      id:         self.id,
      person_id:  self.person_id,
      kind:       decode_role_kind(&self.kind)?,
      start_date: decode_dt(&self.start_date)?,
      end_date,
      notes:      self.notes,
      is_active:  temporal::is_active_at(end_date, now),
    })
  }
}

pub struct RawPhdStudent {
  pub id:                   i64,
  pub person_role_id:       i64,
  pub cohort_number:        Option<i64>,
  pub is_affiliated:        bool,
  pub department:           Option<String>,
  pub discipline:           Option<String>,
  pub project_title:        Option<String>,
  pub planned_defense_date: Option<String>,
  pub is_graduated:         bool,
  pub current_title:        Option<String>,
  pub current_organization: Option<String>,
  pub link:                 Option<String>,
  pub notes:                Option<String>,
}

impl RawPhdStudent {
  pub fn into_phd_student(self) -> Result<PhdStudent> {
    Ok(PhdStudent {
      id:                   self.id,
      person_role_id:       self.person_role_id,
      cohort_number:        self.cohort_number,
      is_affiliated:        self.is_affiliated,
      department:           self.department,
      discipline:           self.discipline,
      project_title:        self.project_title,
      planned_defense_date: decode_opt_dt(
        self.planned_defense_date.as_deref(),
      )?,
      is_graduated:         self.is_graduated,
      current_title:        self.current_title,
      current_organization: self.current_organization,
      link:                 self.link,
      notes:                self.notes,
    })
  }
}

/// `postdocs` rows decode directly; only listed here for symmetry with the
/// date-carrying raws.
pub struct RawPostdoc {
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

impl RawPostdoc {
  pub fn into_postdoc(self) -> Postdoc {
    Postdoc {
      id:                        self.id,
      person_role_id:            self.person_role_id,
      cohort_number:             self.cohort_number,
      department:                self.department,
      discipline:                self.discipline,
      project_title:             self.project_title,
      is_incoming:               self.is_incoming,
      is_graduated:              self.is_graduated,
      current_title_id:          self.current_title_id,
      current_title_other:       self.current_title_other,
      current_institution_id:    self.current_institution_id,
      current_institution_other: self.current_institution_other,
      link:                      self.link,
      notes:                     self.notes,
    }
  }
}

pub struct RawAffiliation {
  pub id:             i64,
  pub person_role_id: i64,
  pub institution_id: i64,
  pub start_date:     Option<String>,
  pub end_date:       Option<String>,
}

impl RawAffiliation {
  pub fn into_affiliation(self, now: DateTime<Utc>) -> Result<Affiliation> {
    let end_date = decode_opt_dt(self.end_date.as_deref())?;
    Ok(Affiliation {
      id:             self.id,
      person_role_id: self.person_role_id,
      institution_id: self.institution_id,
      start_date:     decode_opt_dt(self.start_date.as_deref())?,
      end_date,
      is_active:      temporal::is_active_at(end_date, now),
    })
  }
}

pub struct RawCourseTerm {
  pub id:        i64,
  pub season:    String,
  pub year:      i64,
  pub is_active: bool,
}

impl RawCourseTerm {
  pub fn into_course_term(self) -> Result<CourseTerm> {
    Ok(CourseTerm {
      id:        self.id,
      season:    decode_season(&self.season)?,
      year:      self.year as i32,
      is_active: self.is_active,
    })
  }
}

pub struct RawEnrollment {
  pub id:             i64,
  pub phd_student_id: i64,
  pub course_id:      i64,
  pub is_completed:   bool,
  pub grade:          Option<String>,
}

impl RawEnrollment {
  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      id:             self.id,
      phd_student_id: self.phd_student_id,
      course_id:      self.course_id,
      is_completed:   self.is_completed,
      grade:          self.grade.as_deref().map(decode_grade).transpose()?,
    })
  }
}

pub struct RawActivity {
  pub id:             i64,
  pub phd_student_id: i64,
  pub kind:           String,
  pub activity_id:    Option<i64>,
  pub detail_json:    String,
}

impl RawActivity {
  pub fn into_activity(self) -> Result<StudentActivity> {
    // NULL only exists transiently inside the abroad-insert transaction;
    // a committed row always has the back-filled id.
    let activity_id = self.activity_id.ok_or_else(|| {
      Error::Store(format!("student activity #{} has no activity_id", self.id))
    })?;
    let data: serde_json::Value = serde_json::from_str(&self.detail_json)?;
    Ok(StudentActivity {
      id: self.id,
      phd_student_id: self.phd_student_id,
      activity_id,
      detail: ActivityDetail::from_parts(&self.kind, data)?,
    })
  }
}

pub struct RawLetter {
  pub id:          i64,
  pub parent_kind: String,
  pub parent_id:   i64,
  pub link:        String,
}

impl RawLetter {
  pub fn into_letter(self) -> Result<DecisionLetter> {
    Ok(DecisionLetter {
      id:     self.id,
      parent: LetterParent::from_parts(&self.parent_kind, self.parent_id)?,
      link:   self.link,
    })
  }
}

pub struct RawProject {
  pub id:                     i64,
  pub call_type_id:           i64,
  pub title:                  String,
  pub project_number:         String,
  pub final_report_submitted: bool,
  pub is_extended:            bool,
  pub start_date:             Option<String>,
  pub end_date:               Option<String>,
  pub notes:                  Option<String>,
}

impl RawProject {
  pub fn into_project(self, now: DateTime<Utc>) -> Result<Project> {
    let end_date = decode_opt_dt(self.end_date.as_deref())?;
    Ok(Project {
      id:                     self.id,
      call_type_id:           self.call_type_id,
      title:                  self.title,
      project_number:         self.project_number,
      final_report_submitted: self.final_report_submitted,
      is_extended:            self.is_extended,
      start_date:             decode_opt_dt(self.start_date.as_deref())?,
      end_date,
      notes:                  self.notes,
      status:                 ProjectStatus::derive(
        end_date,
        self.final_report_submitted,
        now,
      ),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn naive_timestamps_decode_as_utc() {
    let expected = Utc.with_ymd_and_hms(2021, 3, 4, 12, 30, 0).unwrap();
    assert_eq!(decode_dt("2021-03-04T12:30:00").unwrap(), expected);
    assert_eq!(decode_dt("2021-03-04 12:30:00").unwrap(), expected);
    assert_eq!(decode_dt("2021-03-04T12:30:00+00:00").unwrap(), expected);
  }

  #[test]
  fn season_rank_case_covers_all_seasons() {
    let case = season_rank_case("t.season");
    for season in Season::ALL {
      assert!(case.contains(encode_season(season)));
      assert!(case.contains(&season.rank().to_string()));
    }
  }
}

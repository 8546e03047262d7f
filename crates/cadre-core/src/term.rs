//! Academic terms and the season cycle.

use serde::{Deserialize, Serialize};

// ─── Season ──────────────────────────────────────────────────────────────────

/// Season of an academic term.
///
/// New terms cycle spring → summer → fall; winter exists only in historical
/// rows and is never produced by [`next_term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
  Spring,
  Summer,
  Fall,
  Winter,
}

impl Season {
  /// Every season, in rank order oldest-first.
  pub const ALL: [Season; 4] =
    [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

  /// Sort rank within a year. Winter ranks below spring so legacy winter
  /// terms order as the oldest part of their year.
  pub fn rank(self) -> i64 {
    match self {
      Season::Winter => -1,
      Season::Spring => 0,
      Season::Summer => 1,
      Season::Fall => 2,
    }
  }
}

// ─── Term ────────────────────────────────────────────────────────────────────

/// A concrete academic term. Terms are only ever created through the
/// sequencer (`next_term`); season and year are immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTerm {
  pub id:        i64,
  pub season:    Season,
  pub year:      i32,
  /// Stored admin flag, independent of any date math.
  pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourseTermPatch {
  pub is_active: Option<bool>,
}

/// The term issued when no terms exist yet.
pub const FIRST_TERM: (Season, i32) = (Season::Spring, 2019);

/// Season and year of the term following `latest`.
///
/// A winter input bridges to spring of the same year; fall rolls the year
/// over. `None` yields [`FIRST_TERM`].
pub fn next_term(latest: Option<(Season, i32)>) -> (Season, i32) {
  match latest {
    None => FIRST_TERM,
    Some((Season::Winter, year)) => (Season::Spring, year),
    Some((Season::Spring, year)) => (Season::Summer, year),
    Some((Season::Summer, year)) => (Season::Fall, year),
    Some((Season::Fall, year)) => (Season::Spring, year + 1),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cycle_from_empty() {
    let mut latest = None;
    let mut produced = Vec::new();
    for _ in 0..4 {
      let next = next_term(latest);
      produced.push(next);
      latest = Some(next);
    }
    assert_eq!(produced, vec![
      (Season::Spring, 2019),
      (Season::Summer, 2019),
      (Season::Fall, 2019),
      (Season::Spring, 2020),
    ]);
  }

  #[test]
  fn winter_bridges_to_spring_of_same_year() {
    assert_eq!(next_term(Some((Season::Winter, 2020))), (Season::Spring, 2020));
  }

  #[test]
  fn winter_is_never_produced() {
    let mut latest = Some(FIRST_TERM);
    for _ in 0..12 {
      let next = next_term(latest);
      assert_ne!(next.0, Season::Winter);
      latest = Some(next);
    }
  }

  #[test]
  fn ranks_order_a_year_oldest_first() {
    let mut seasons = Season::ALL;
    seasons.sort_by_key(|s| s.rank());
    assert_eq!(seasons, Season::ALL);
    assert!(Season::Winter.rank() < Season::Spring.rank());
  }
}

//! Date-derived activity status.
//!
//! Entities carrying a start/end date pair never store an "active" flag; it
//! is derived at read time from the end date alone, relative to the start of
//! the current day in UTC. Timezone-naive timestamps are normalised to UTC
//! when decoded from storage, so comparisons here are always aware-to-aware.

use chrono::{DateTime, NaiveTime, Utc};

/// Truncate `now` to 00:00:00 of the same UTC day.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
  now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// An entity is active iff it has no end date or its end date has not yet
/// passed. The comparison is against the start of the current day, so an
/// end date of "today" still counts as active. Start dates never affect
/// the result.
pub fn is_active_at(
  end_date: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> bool {
  match end_date {
    None => true,
    Some(end) => end >= start_of_day(now),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;

  #[test]
  fn no_end_date_is_active() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
    assert!(is_active_at(None, now));
  }

  #[test]
  fn past_end_date_is_inactive() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
    let yesterday = now - Duration::days(1);
    assert!(!is_active_at(Some(yesterday), now));
  }

  #[test]
  fn end_date_today_is_still_active() {
    // Inclusive boundary: ending at the very start of today counts.
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
    let midnight = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
    assert!(is_active_at(Some(midnight), now));

    let later_today = Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap();
    assert!(is_active_at(Some(later_today), now));
  }

  #[test]
  fn end_of_yesterday_is_inactive() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 1).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 59).unwrap();
    assert!(!is_active_at(Some(end), now));
  }
}

// src/utils/time.rs

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Calendar date of `instant` in a zone `offset_minutes` east of UTC.
/// Offsets outside ±24h fall back to UTC.
pub fn local_date(instant: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    match FixedOffset::east_opt(offset_minutes * 60) {
        Some(offset) => instant.with_timezone(&offset).date_naive(),
        None => instant.date_naive(),
    }
}

pub fn today(offset_minutes: i32) -> NaiveDate {
    local_date(Utc::now(), offset_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn late_utc_evening_is_tomorrow_in_india() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 3, 20, 0, 0).unwrap();
        assert_eq!(local_date(instant, 330), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(local_date(instant, 0), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(local_date(instant, -300), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }

    #[test]
    fn absurd_offset_uses_utc() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 3, 23, 0, 0).unwrap();
        assert_eq!(local_date(instant, 100_000), instant.date_naive());
    }
}

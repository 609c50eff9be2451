//! Calendar view models: month grids and day timelines over appointments.
//!
//! Everything here is a pure function of (appointments, reference date or
//! month, current time, config). Nothing mutates the appointment snapshot and
//! nothing fails: records with unusable dates or times are left out of the
//! view they cannot be placed in.

mod bucket;
mod day;
mod month;
mod types;

pub use bucket::*;
pub use day::*;
pub use month::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CalendarError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid visible hour range: {start}..{end}")]
    InvalidHourRange { start: u32, end: u32 },

    #[error("Invalid pixels-per-minute scale: {0}")]
    InvalidScale(f64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Parse a `YYYY-MM-DD` date coming from a caller rather than a record.
pub fn parse_view_date(raw: &str) -> Result<chrono::NaiveDate, CalendarError> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ingest_all, Appointment, AppointmentStatus, WeekStart};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mock_appointments() -> Vec<Appointment> {
        let json = r#"[
            {"id": "A001", "patientId": "P001", "patientName": "Emily Blunt", "doctorName": "Dr. Smith",
             "date": "2023-12-15", "time": "09:00 AM", "duration": 30, "type": "Check-up", "status": "Confirmed"},
            {"id": "A002", "patientId": "P002", "patientName": "Michael Chen", "doctorName": "Dr. Smith",
             "date": "2023-12-15", "time": "10:30 AM", "duration": 45, "type": "Follow-up", "status": "Pending"},
            {"id": "A003", "patientId": "P004", "patientName": "David Kim", "doctorName": "Dr. Smith",
             "date": "2023-12-16", "time": "14:00 PM", "type": "Vaccination", "status": "Confirmed"}
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    // ── Month Tests ────────────────────────────────────────────────────

    #[test]
    fn test_month_validation() {
        assert!(YearMonth::new(2024, 12).is_ok());
        assert_eq!(
            YearMonth::new(2024, 13),
            Err(CalendarError::InvalidMonth { year: 2024, month: 13 })
        );
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(YearMonth::containing(ymd(2024, 2, 29)), YearMonth::new(2024, 2).unwrap());
        assert_eq!(YearMonth::new(2024, 2).unwrap().last_day(), ymd(2024, 2, 29));
        assert_eq!(YearMonth::new(2023, 2).unwrap().last_day(), ymd(2023, 2, 28));
    }

    #[test]
    fn test_month_grid_from_mock_data() {
        let list = ingest_all(mock_appointments());
        let grid = build_month_grid(
            &list,
            YearMonth::new(2023, 12).unwrap(),
            WeekStart::Sunday,
            ymd(2023, 12, 15),
        );

        // Dec 2023: Fri 1st .. Sun 31st → Nov 26 .. Jan 6
        assert_eq!(grid.first_date(), Some(ymd(2023, 11, 26)));
        assert_eq!(grid.last_date(), Some(ymd(2024, 1, 6)));
        assert_eq!(grid.cells.len(), 42);

        let dec15 = grid.cells.iter().find(|c| c.date == ymd(2023, 12, 15)).unwrap();
        assert!(dec15.is_today);
        assert_eq!(dec15.appointment_count, 2);
        let total: usize = grid.cells.iter().map(|c| c.appointment_count).sum();
        assert_eq!(total, 3);
    }

    // ── Timeline Tests ─────────────────────────────────────────────────

    #[test]
    fn test_timeline_config_validation() {
        assert!(TimelineConfig::new(7, 21, 2.0).is_ok());
        assert_eq!(
            TimelineConfig::new(21, 7, 2.0),
            Err(CalendarError::InvalidHourRange { start: 21, end: 7 })
        );
        assert!(TimelineConfig::new(0, 25, 2.0).is_err());
        assert!(TimelineConfig::new(8, 8, 2.0).is_err());
        assert!(TimelineConfig::new(7, 21, 0.0).is_err());
        assert!(TimelineConfig::new(7, 21, f64::NAN).is_err());
    }

    #[test]
    fn test_day_timeline_from_mock_data() {
        let list = ingest_all(mock_appointments());
        let day = ymd(2023, 12, 15);
        let now = day.and_hms_opt(10, 0, 0).unwrap();
        let timeline = layout_day(&list, day, now, &TimelineConfig::default());

        assert_eq!(timeline.heading, "Friday, December 15th");
        assert_eq!(timeline.blocks.len(), 2);
        assert_eq!(timeline.blocks[0].top_px, 240.0);
        assert_eq!(timeline.blocks[1].top_px, 210.0 * 2.0);
        assert_eq!(timeline.blocks[1].height_px, 90.0);
        assert_eq!(timeline.blocks[1].accent, "#22c55e");
        assert_eq!(timeline.now.as_ref().map(|n| n.top_px), Some(360.0));
    }

    #[test]
    fn test_malformed_time_on_other_day_reported() {
        let list = ingest_all(mock_appointments());
        let day = ymd(2023, 12, 16);
        let now = ymd(2023, 12, 15).and_hms_opt(10, 0, 0).unwrap();
        let timeline = layout_day(&list, day, now, &TimelineConfig::default());
        assert!(timeline.blocks.is_empty());
        assert_eq!(timeline.skipped, vec!["A003"]);
        assert!(timeline.now.is_none());
    }

    #[test]
    fn test_status_is_passed_through() {
        let mut records = mock_appointments();
        records[0].status = AppointmentStatus::Cancelled;
        let list = ingest_all(records);
        let day = ymd(2023, 12, 15);
        let timeline = layout_day(&list, day, day.and_hms_opt(0, 0, 0).unwrap(), &TimelineConfig::default());
        assert_eq!(timeline.blocks[0].status, "Cancelled");
    }

    #[test]
    fn test_parse_view_date() {
        assert_eq!(parse_view_date("2024-03-01"), Ok(ymd(2024, 3, 1)));
        assert_eq!(
            parse_view_date("03/01/2024"),
            Err(CalendarError::InvalidDate("03/01/2024".into()))
        );
    }

    #[test]
    fn test_day_timeline_serializes() {
        let list = ingest_all(mock_appointments());
        let day = ymd(2023, 12, 15);
        let timeline = layout_day(&list, day, day.and_hms_opt(8, 0, 0).unwrap(), &TimelineConfig::default());
        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["date"], "2023-12-15");
        assert_eq!(json["config"]["start_hour"], 7);
        assert_eq!(json["blocks"][0]["category"], "regular");
    }
}

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::bucket::appointments_on;
use super::types::{
    DayTimeline, NowIndicator, PositionedBlock, TimeSlot, TimelineConfig, SCROLL_ANCHOR_HOUR,
    SLOT_MINUTES,
};
use crate::models::ScheduledAppointment;

/// Place same-day appointments on the canvas.
///
/// Returns the blocks in input order and the ids of appointments without a
/// usable start time, which are left off.
pub fn layout_blocks(
    same_day: &[&ScheduledAppointment],
    config: &TimelineConfig,
) -> (Vec<PositionedBlock>, Vec<String>) {
    let ppm = config.pixels_per_minute();
    let mut blocks = Vec::with_capacity(same_day.len());
    let mut skipped = Vec::new();

    for appt in same_day {
        let Some(start_minutes) = appt.start_minutes() else {
            tracing::warn!(id = %appt.id(), time = ?appt.record.time, "Skipping appointment without start time");
            skipped.push(appt.id().to_string());
            continue;
        };

        let offset_minutes = start_minutes - config.window_start_minutes();
        let time_label = appt.record.time.as_deref().unwrap_or_default().trim();

        blocks.push(PositionedBlock {
            id: appt.id().to_string(),
            patient_name: appt.record.patient_name.clone(),
            label: format!("{time_label} - {}", appt.record.appointment_type),
            room: appt.record.room.clone(),
            category: appt.category,
            accent: appt.category.accent(),
            status: appt.status().as_str().to_string(),
            offset_minutes,
            top_px: offset_minutes.max(0) as f64 * ppm,
            height_px: f64::from(appt.duration_minutes) * ppm,
        });
    }

    (blocks, skipped)
}

/// The "now" line, when `day` is today and the clock is inside the window.
pub fn now_indicator(
    day: NaiveDate,
    now: NaiveDateTime,
    config: &TimelineConfig,
) -> Option<NowIndicator> {
    let hour = now.hour();
    if now.date() != day || hour < config.start_hour() || hour >= config.end_hour() {
        return None;
    }
    let minutes = i64::from(hour) * 60 + i64::from(now.minute()) - config.window_start_minutes();
    Some(NowIndicator {
        label: now.format("%I:%M").to_string(),
        top_px: minutes as f64 * config.pixels_per_minute(),
    })
}

/// Half-hour rows covering the visible window.
pub fn time_slots(config: &TimelineConfig) -> Vec<TimeSlot> {
    let slot_height = config.slot_height_px();
    (config.start_hour()..config.end_hour())
        .flat_map(|h| [(h, 0), (h, SLOT_MINUTES)])
        .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .enumerate()
        .map(|(index, time)| TimeSlot {
            label: time.format("%I:%M %p").to_string(),
            top_px: index as f64 * slot_height,
            height_px: slot_height,
            major: index % 2 == 0,
        })
        .collect()
}

/// Initial scroll position so the view opens at 8 AM.
pub fn scroll_anchor_px(config: &TimelineConfig) -> f64 {
    let minutes = (i64::from(SCROLL_ANCHOR_HOUR) * 60 - config.window_start_minutes()).max(0);
    minutes as f64 * config.pixels_per_minute()
}

/// "Monday, January 15th"
pub fn day_heading(day: NaiveDate) -> String {
    let n = day.day();
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {n}{suffix}", day.format("%A, %B"))
}

/// Full day view for `day` out of an unfiltered appointment list.
pub fn layout_day(
    appointments: &[ScheduledAppointment],
    day: NaiveDate,
    now: NaiveDateTime,
    config: &TimelineConfig,
) -> DayTimeline {
    let same_day = appointments_on(appointments, day);
    let (blocks, skipped) = layout_blocks(&same_day, config);

    if !skipped.is_empty() {
        tracing::debug!(%day, skipped = skipped.len(), "Day timeline omitted appointments");
    }

    DayTimeline {
        date: day,
        heading: day_heading(day),
        config: *config,
        height_px: config.canvas_height_px(),
        scroll_anchor_px: scroll_anchor_px(config),
        slots: time_slots(config),
        blocks,
        now: now_indicator(day, now, config),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ingest_all, Appointment, AppointmentCategory, AppointmentStatus};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, 0).unwrap()
    }

    fn appt(id: &str, time: Option<&str>, duration: Option<i64>, kind: &str) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: "P001".into(),
            patient_name: "Emily Blunt".into(),
            doctor_name: "Dr. Smith".into(),
            date: "2024-01-15".into(),
            time: time.map(Into::into),
            duration,
            appointment_type: kind.into(),
            status: AppointmentStatus::Confirmed,
            room: Some("Room 101".into()),
        }
    }

    #[test]
    fn ten_am_half_hour_block() {
        let list = ingest_all(vec![appt("A1", Some("10:00 AM"), Some(30), "Check-up")]);
        let day = ymd(2024, 1, 15);
        let timeline = layout_day(&list, day, at(ymd(2024, 1, 1), 9, 0), &TimelineConfig::default());

        assert_eq!(timeline.blocks.len(), 1);
        let block = &timeline.blocks[0];
        assert_eq!(block.offset_minutes, 180);
        assert_eq!(block.top_px, 360.0);
        assert_eq!(block.height_px, 60.0);
        assert_eq!(block.label, "10:00 AM - Check-up");
        assert_eq!(block.room.as_deref(), Some("Room 101"));
        assert_eq!(block.accent, "#3b82f6");
    }

    #[test]
    fn before_window_clamps_to_top() {
        let list = ingest_all(vec![appt("A1", Some("06:00 AM"), Some(90), "Urgent")]);
        let timeline = layout_day(&list, ymd(2024, 1, 15), at(ymd(2024, 1, 1), 9, 0), &TimelineConfig::default());
        let block = &timeline.blocks[0];
        assert_eq!(block.offset_minutes, -60);
        assert_eq!(block.top_px, 0.0);
        assert_eq!(block.height_px, 180.0);
        assert_eq!(block.category, AppointmentCategory::Urgent);
    }

    #[test]
    fn missing_time_is_skipped_not_fatal() {
        let list = ingest_all(vec![
            appt("A1", None, Some(30), "Check-up"),
            appt("A2", Some("14:00 PM"), Some(30), "Check-up"),
            appt("A3", Some("02:00 PM"), None, "Follow-up"),
        ]);
        let timeline = layout_day(&list, ymd(2024, 1, 15), at(ymd(2024, 1, 1), 9, 0), &TimelineConfig::default());
        assert_eq!(timeline.skipped, vec!["A1", "A2"]);
        assert_eq!(timeline.blocks.len(), 1);
        let block = &timeline.blocks[0];
        assert_eq!(block.id, "A3");
        assert_eq!(block.height_px, 0.0);
        assert_eq!(block.top_px, (14 * 60 - 7 * 60) as f64 * 2.0);
    }

    #[test]
    fn heights_scale_exactly_and_tops_never_negative() {
        let config = TimelineConfig::new(6, 20, 1.5).unwrap();
        let times = ["12:00 AM", "05:59 AM", "06:00 AM", "11:45 AM", "07:30 PM", "11:59 PM"];
        let records: Vec<_> = times
            .iter()
            .enumerate()
            .map(|(i, t)| appt(&format!("A{i}"), Some(t), Some(i as i64 * 25), "Check-up"))
            .collect();
        let list = ingest_all(records);
        let same_day: Vec<_> = list.iter().collect();
        let (blocks, skipped) = layout_blocks(&same_day, &config);
        assert!(skipped.is_empty());
        for (i, block) in blocks.iter().enumerate() {
            assert!(block.top_px >= 0.0);
            assert_eq!(block.height_px, (i as f64 * 25.0) * 1.5);
        }
    }

    #[test]
    fn other_days_are_not_laid_out() {
        let mut other = appt("B1", Some("10:00 AM"), Some(30), "Check-up");
        other.date = "2024-01-16".into();
        let list = ingest_all(vec![appt("A1", Some("10:00 AM"), Some(30), "Check-up"), other]);
        let timeline = layout_day(&list, ymd(2024, 1, 15), at(ymd(2024, 1, 1), 9, 0), &TimelineConfig::default());
        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.blocks[0].id, "A1");
    }

    #[test]
    fn now_line_only_today_inside_window() {
        let config = TimelineConfig::default();
        let day = ymd(2024, 1, 15);

        let now = now_indicator(day, at(day, 9, 30), &config).unwrap();
        assert_eq!(now.top_px, 150.0 * 2.0);
        assert_eq!(now.label, "09:30");

        assert!(now_indicator(day, at(day, 6, 59), &config).is_none());
        assert!(now_indicator(day, at(day, 21, 0), &config).is_none());
        assert!(now_indicator(day, at(ymd(2024, 1, 16), 9, 30), &config).is_none());
        assert!(now_indicator(day, at(day, 20, 59), &config).is_some());
    }

    #[test]
    fn slots_cover_window_in_half_hours() {
        let slots = time_slots(&TimelineConfig::default());
        assert_eq!(slots.len(), 28);
        assert_eq!(slots[0].label, "07:00 AM");
        assert!(slots[0].major);
        assert_eq!(slots[1].label, "07:30 AM");
        assert!(!slots[1].major);
        assert_eq!(slots[1].top_px, 60.0);
        assert_eq!(slots.last().unwrap().label, "08:30 PM");
    }

    #[test]
    fn canvas_and_scroll_anchor() {
        let config = TimelineConfig::default();
        assert_eq!(config.canvas_height_px(), 1680.0);
        assert_eq!(scroll_anchor_px(&config), 120.0);

        let late = TimelineConfig::new(9, 17, 2.0).unwrap();
        assert_eq!(scroll_anchor_px(&late), 0.0);
    }

    #[test]
    fn headings_use_ordinals() {
        assert_eq!(day_heading(ymd(2024, 1, 15)), "Monday, January 15th");
        assert_eq!(day_heading(ymd(2024, 3, 1)), "Friday, March 1st");
        assert_eq!(day_heading(ymd(2024, 3, 22)), "Friday, March 22nd");
        assert_eq!(day_heading(ymd(2024, 3, 13)), "Wednesday, March 13th");
    }

    #[test]
    fn layout_is_deterministic() {
        let list = ingest_all(vec![appt("A1", Some("10:00 AM"), Some(30), "Check-up")]);
        let day = ymd(2024, 1, 15);
        let now = at(day, 10, 5);
        let config = TimelineConfig::default();
        assert_eq!(layout_day(&list, day, now, &config), layout_day(&list, day, now, &config));
    }
}

use chrono::{Datelike, Days, NaiveDate};

use super::bucket::bucket_by_day;
use super::types::{CalendarCell, MonthGrid, YearMonth};
use crate::models::{ScheduledAppointment, WeekStart};

const WEEKDAYS_FROM_SUNDAY: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Column headers in display order.
pub fn weekday_labels(week_start: WeekStart) -> Vec<&'static str> {
    let shift = match week_start {
        WeekStart::Sunday => 0,
        WeekStart::Monday => 1,
    };
    (0..7).map(|i| WEEKDAYS_FROM_SUNDAY[(i + shift) % 7]).collect()
}

/// Dates covered by the month view: whole weeks from the week holding the
/// 1st through the week holding the last day.
pub fn grid_dates(month: YearMonth, week_start: WeekStart) -> Vec<NaiveDate> {
    let first = month.first_day();
    let last = month.last_day();

    let lead = week_start.offset_of(first.weekday());
    let trail = 6 - week_start.offset_of(last.weekday());

    let start = first.checked_sub_days(Days::new(u64::from(lead))).unwrap_or(first);
    let end = last.checked_add_days(Days::new(u64::from(trail))).unwrap_or(last);

    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Build the month view for `month`, bucketing `appointments` into cells.
pub fn build_month_grid(
    appointments: &[ScheduledAppointment],
    month: YearMonth,
    week_start: WeekStart,
    today: NaiveDate,
) -> MonthGrid {
    let buckets = bucket_by_day(appointments);

    let cells = grid_dates(month, week_start)
        .into_iter()
        .map(|date| {
            let day_appointments: Vec<ScheduledAppointment> = buckets
                .get(&date)
                .map(|list| list.iter().map(|a| (*a).clone()).collect())
                .unwrap_or_default();
            let in_month = month.contains(date);
            let is_today = date == today;
            let appointment_count = day_appointments.len();
            CalendarCell {
                date,
                in_month,
                is_today,
                appointment_count,
                has_indicator: appointment_count > 0 && (in_month || is_today),
                appointments: day_appointments,
            }
        })
        .collect();

    MonthGrid {
        year: month.year(),
        month: month.month(),
        title: month.first_day().format("%B %Y").to_string(),
        week_start,
        weekday_labels: weekday_labels(week_start),
        cells,
    }
}

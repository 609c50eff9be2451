use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use super::CalendarError;
use crate::models::{AppointmentCategory, ScheduledAppointment, WeekStart};

/// Default first visible hour of the day timeline (7 AM).
pub const DEFAULT_START_HOUR: u32 = 7;
/// Default end of the visible range, exclusive (9 PM).
pub const DEFAULT_END_HOUR: u32 = 21;
pub const DEFAULT_PIXELS_PER_MINUTE: f64 = 2.0;
/// Slot granularity of the time grid.
pub const SLOT_MINUTES: u32 = 30;
/// Hour the timeline scrolls to when first shown.
pub const SCROLL_ANCHOR_HOUR: u32 = 8;
/// Appointments listed inside a month cell before "+ N more".
pub const CELL_PREVIEW_LIMIT: usize = 3;

// ── Month ──────────────────────────────────────────────────────────────────

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(CalendarError::InvalidMonth { year, month })
    }

    /// The month a given date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Following month; saturates at the end of the representable range.
    pub fn next(&self) -> Self {
        self.0
            .checked_add_months(Months::new(1))
            .map(Self)
            .unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map(Self)
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

/// One square of a month view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub appointment_count: usize,
    /// Mini-calendar dot: appointments exist and the cell is in the month or today.
    pub has_indicator: bool,
    pub appointments: Vec<ScheduledAppointment>,
}

impl CalendarCell {
    /// First `limit` appointments plus how many were left out.
    pub fn preview(&self, limit: usize) -> CellPreview<'_> {
        let shown = &self.appointments[..self.appointments.len().min(limit)];
        CellPreview {
            shown,
            overflow: self.appointments.len() - shown.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellPreview<'a> {
    pub shown: &'a [ScheduledAppointment],
    pub overflow: usize,
}

/// Whole-week rectangular grid for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub week_start: WeekStart,
    pub weekday_labels: Vec<&'static str>,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell> {
        self.cells.chunks(7)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.cells.first().map(|c| c.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.cells.last().map(|c| c.date)
    }
}

// ── Day timeline ───────────────────────────────────────────────────────────

/// Visible hour window and vertical scale of the day view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineConfig {
    start_hour: u32,
    end_hour: u32,
    pixels_per_minute: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            pixels_per_minute: DEFAULT_PIXELS_PER_MINUTE,
        }
    }
}

impl TimelineConfig {
    /// `start_hour < end_hour <= 24`, scale finite and positive.
    pub fn new(start_hour: u32, end_hour: u32, pixels_per_minute: f64) -> Result<Self, CalendarError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(CalendarError::InvalidHourRange {
                start: start_hour,
                end: end_hour,
            });
        }
        if !pixels_per_minute.is_finite() || pixels_per_minute <= 0.0 {
            return Err(CalendarError::InvalidScale(pixels_per_minute));
        }
        Ok(Self {
            start_hour,
            end_hour,
            pixels_per_minute,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn pixels_per_minute(&self) -> f64 {
        self.pixels_per_minute
    }

    /// Minutes from midnight to the top of the visible window.
    pub fn window_start_minutes(&self) -> i64 {
        i64::from(self.start_hour) * 60
    }

    pub fn canvas_height_px(&self) -> f64 {
        f64::from((self.end_hour - self.start_hour) * 60) * self.pixels_per_minute
    }

    pub fn slot_height_px(&self) -> f64 {
        f64::from(SLOT_MINUTES) * self.pixels_per_minute
    }
}

/// An appointment placed on the day canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedBlock {
    pub id: String,
    pub patient_name: String,
    pub label: String,
    pub room: Option<String>,
    pub category: AppointmentCategory,
    pub accent: &'static str,
    pub status: String,
    /// Signed distance from the window start; negative when before it.
    pub offset_minutes: i64,
    pub top_px: f64,
    pub height_px: f64,
}

/// Red "now" line of the day view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowIndicator {
    pub label: String,
    pub top_px: f64,
}

/// One 30-minute row of the time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlot {
    pub label: String,
    pub top_px: f64,
    pub height_px: f64,
    /// On-the-hour rows draw a solid line, half-hours a dashed one.
    pub major: bool,
}

/// Everything the day view needs for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTimeline {
    pub date: NaiveDate,
    pub heading: String,
    pub config: TimelineConfig,
    pub height_px: f64,
    pub scroll_anchor_px: f64,
    pub slots: Vec<TimeSlot>,
    pub blocks: Vec<PositionedBlock>,
    pub now: Option<NowIndicator>,
    /// Ids of same-day appointments left off the canvas (no usable time).
    pub skipped: Vec<String>,
}

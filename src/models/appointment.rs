//! Appointment records as the backend sends them, and their ingested form.
//!
//! `Appointment` mirrors the wire JSON (camelCase, free-text `type`, string
//! date and time). `ScheduledAppointment` is what every view works on: date,
//! start time, duration and category are resolved once here so the layout
//! code never re-parses strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ─── Wire record ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub patient_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub doctor_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String, // YYYY-MM-DD
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub time: Option<String>, // hh:mm AM/PM
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration: Option<i64>,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub appointment_type: String,
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: AppointmentStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub room: Option<String>,
}

/// Decode a backend list record by record.
///
/// Records that still fail (no usable `id`, not an object) are logged and
/// dropped; the rest of the list is kept.
pub fn decode_records(values: Vec<Value>) -> Vec<Appointment> {
    let total = values.len();
    let records: Vec<Appointment> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable appointment record");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!(kept = records.len(), total, "Some appointment records were dropped");
    }
    records
}

/// Field decoders that map `null` and mistyped values to the field default
/// instead of failing the record.
mod lenient {
    use super::{AppointmentStatus, Deserialize, Deserializer, Value};
    use serde::de::Error;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// String or number; anything else rejects the record.
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        scalar_text(Value::deserialize(d)?)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| D::Error::custom("appointment id must be a non-empty string or number"))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    /// Whole minutes from a number or a numeric string.
    pub fn minutes<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<AppointmentStatus, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => AppointmentStatus::from(s),
            _ => AppointmentStatus::default(),
        })
    }
}

/// Lifecycle status. Unrecognized backend values are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
    Completed,
    Other(String),
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Pending => "Pending",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
            Self::Other(raw) => raw,
        }
    }

    /// Upcoming appointments are the ones still open for check-in or cancel.
    pub fn is_upcoming(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Badge colour token for list views.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Confirmed => "green",
            Self::Pending => "yellow",
            Self::Cancelled => "red",
            Self::Completed | Self::Other(_) => "gray",
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        let known = match raw.trim() {
            "Confirmed" | "confirmed" => Some(Self::Confirmed),
            "Pending" | "pending" => Some(Self::Pending),
            "Cancelled" | "cancelled" | "Canceled" | "canceled" => Some(Self::Cancelled),
            "Completed" | "completed" => Some(Self::Completed),
            _ => None,
        };
        known.unwrap_or(Self::Other(raw))
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Visual category derived from the free-text `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentCategory {
    FollowUp,
    Urgent,
    Regular,
}

impl AppointmentCategory {
    /// Substring match on the lower-cased type; "follow" wins over "urgent".
    pub fn classify(appointment_type: &str) -> Self {
        let lowered = appointment_type.to_lowercase();
        if lowered.contains("follow") {
            Self::FollowUp
        } else if lowered.contains("urgent") || lowered.contains("emergency") {
            Self::Urgent
        } else {
            Self::Regular
        }
    }

    /// Accent colour for the block border / dot.
    pub fn accent(&self) -> &'static str {
        match self {
            Self::FollowUp => "#22c55e",
            Self::Urgent => "#ef4444",
            Self::Regular => "#3b82f6",
        }
    }
}

// ─── Ingested form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAppointment {
    #[serde(flatten)]
    pub record: Appointment,
    #[serde(rename = "calendarDate")]
    pub calendar_date: Option<NaiveDate>,
    #[serde(rename = "startTime")]
    pub start: Option<NaiveTime>,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    pub category: AppointmentCategory,
}

impl ScheduledAppointment {
    /// Resolve a wire record. Never fails: unparsable fields become `None`.
    pub fn ingest(record: Appointment) -> Self {
        let calendar_date = parse_calendar_date(&record.date);
        if calendar_date.is_none() {
            tracing::warn!(id = %record.id, date = %record.date, "Unparsable appointment date");
        }

        let start = record.time.as_deref().and_then(parse_start_time);
        if start.is_none() {
            tracing::debug!(id = %record.id, time = ?record.time, "Appointment has no usable start time");
        }

        let duration_minutes = record
            .duration
            .map(|d| d.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);
        let category = AppointmentCategory::classify(&record.appointment_type);

        Self {
            record,
            calendar_date,
            start,
            duration_minutes,
            category,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn status(&self) -> &AppointmentStatus {
        &self.record.status
    }

    /// Minutes since midnight of the start time.
    pub fn start_minutes(&self) -> Option<i64> {
        self.start
            .map(|t| i64::from(t.hour()) * 60 + i64::from(t.minute()))
    }

    /// Same record with a new status; the original snapshot stays untouched.
    pub fn with_status(&self, status: AppointmentStatus) -> Self {
        let mut next = self.clone();
        next.record.status = status;
        next
    }
}

/// Ingest a whole batch, preserving order.
pub fn ingest_all(records: Vec<Appointment>) -> Vec<ScheduledAppointment> {
    records.into_iter().map(ScheduledAppointment::ingest).collect()
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parse the calendar date of a record as written.
///
/// Accepts `YYYY-MM-DD`, a naive ISO date-time, or an RFC 3339 timestamp. For
/// timestamps the local date as written is kept; no zone conversion happens.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a wall-clock start time.
///
/// `hh:mm AM/PM` (designator case-insensitive) or bare 24-hour `HH:MM`.
/// A 24-hour value with a designator ("14:00 PM") is rejected.
pub fn parse_start_time(raw: &str) -> Option<NaiveTime> {
    let normalized = raw.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized.ends_with("AM") || normalized.ends_with("PM") {
        let (clock, designator) = normalized.split_at(normalized.len() - 2);
        let spaced = format!("{} {}", clock.trim_end(), designator);
        return NaiveTime::parse_from_str(&spaced, "%I:%M %p").ok();
    }
    NaiveTime::parse_from_str(&normalized, "%H:%M").ok()
}

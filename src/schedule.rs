//! Appointment list views for the upcoming/history tabs, patient and doctor
//! filters, and the check-in / cancel transitions.
//!
//! Transitions never touch the caller's list: they return the replacement
//! record and the store publishes a new snapshot with it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AppointmentStatus, ScheduledAppointment};

#[derive(Error, Debug, PartialEq)]
pub enum ScheduleError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Cannot move appointment {id} from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },
}

/// Tabs of the appointment list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListTab {
    #[default]
    Upcoming,
    History,
    All,
}

/// Status changes a user can trigger from a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Cancel,
    /// "Check in" in the UI.
    Complete,
}

impl StatusAction {
    pub fn target(&self) -> AppointmentStatus {
        match self {
            Self::Cancel => AppointmentStatus::Cancelled,
            Self::Complete => AppointmentStatus::Completed,
        }
    }
}

/// Appointments belonging to `tab`, order preserved.
pub fn partition(list: &[ScheduledAppointment], tab: ListTab) -> Vec<&ScheduledAppointment> {
    list.iter()
        .filter(|a| match tab {
            ListTab::Upcoming => a.status().is_upcoming(),
            ListTab::History => !a.status().is_upcoming(),
            ListTab::All => true,
        })
        .collect()
}

pub fn for_patient<'a>(
    list: &'a [ScheduledAppointment],
    patient_id: &str,
) -> Vec<&'a ScheduledAppointment> {
    list.iter()
        .filter(|a| a.record.patient_id == patient_id)
        .collect()
}

/// A doctor's agenda for one day, earliest first. Untimed entries go last.
pub fn agenda_for<'a>(
    list: &'a [ScheduledAppointment],
    doctor_name: &str,
    day: NaiveDate,
) -> Vec<&'a ScheduledAppointment> {
    let mut agenda: Vec<_> = list
        .iter()
        .filter(|a| a.calendar_date == Some(day) && a.record.doctor_name == doctor_name)
        .collect();
    // stable: equal times keep list order
    agenda.sort_by_key(|a| (a.start.is_none(), a.start));
    agenda
}

/// Compute the record that results from `action`. Only upcoming
/// appointments can be cancelled or checked in.
pub fn apply_action(
    list: &[ScheduledAppointment],
    id: &str,
    action: StatusAction,
) -> Result<ScheduledAppointment, ScheduleError> {
    let current = list
        .iter()
        .find(|a| a.id() == id)
        .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;

    let target = action.target();
    if !current.status().is_upcoming() {
        return Err(ScheduleError::InvalidTransition {
            id: id.to_string(),
            from: current.status().as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }

    Ok(current.with_status(target))
}

//! Shared types for the HTTP layer.

use std::borrow::Cow;
use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;
use crate::models::ScheduledAppointment;
use crate::session::Session;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Session scoping
// ═══════════════════════════════════════════════════════════

/// The part of `list` the session may see.
///
/// Clinical staff see everything. Patients and parents are narrowed to the
/// patient their session is scoped to; a session without a patient id keeps
/// whatever the source returned (the backend already scoped it by token).
pub fn visible_to<'a>(
    session: &Session,
    list: &'a [ScheduledAppointment],
) -> Cow<'a, [ScheduledAppointment]> {
    match (&session.patient_id, session.role.sees_full_schedule()) {
        (Some(patient_id), false) => Cow::Owned(
            list.iter()
                .filter(|a| &a.record.patient_id == patient_id)
                .cloned()
                .collect(),
        ),
        _ => Cow::Borrowed(list),
    }
}

/// An appointment with its list-view colour tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: ScheduledAppointment,
    pub badge: &'static str,
    pub accent: &'static str,
}

impl From<ScheduledAppointment> for AppointmentView {
    fn from(appointment: ScheduledAppointment) -> Self {
        Self {
            badge: appointment.status().badge(),
            accent: appointment.category.accent(),
            appointment,
        }
    }
}

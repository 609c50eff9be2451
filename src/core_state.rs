//! Shared application state behind the HTTP surface.
//!
//! `CoreState` holds the ingested appointment snapshot, the active session
//! and the layout configuration. Readers clone the snapshot `Arc` and drop
//! the lock before doing any layout work; writers publish a whole new
//! snapshot.

use std::sync::{Arc, RwLock};

use crate::calendar::TimelineConfig;
use crate::client::{AppointmentSource, ClientError, DataSource};
use crate::models::{ingest_all, Appointment, ScheduledAppointment, WeekStart};
use crate::schedule::{self, ScheduleError, StatusAction};
use crate::session::{AuthEvent, AuthEvents, Session};

pub type Snapshot = Arc<Vec<ScheduledAppointment>>;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    appointments: RwLock<Snapshot>,
    session: RwLock<Option<Session>>,
    auth_events: AuthEvents,
    source: Option<DataSource>,
    pub timeline: TimelineConfig,
    pub week_start: WeekStart,
}

impl CoreState {
    pub fn new(timeline: TimelineConfig, week_start: WeekStart) -> Self {
        Self {
            appointments: RwLock::new(Arc::new(Vec::new())),
            session: RwLock::new(None),
            auth_events: AuthEvents::new(),
            source: None,
            timeline,
            week_start,
        }
    }

    /// Attach the source used by [`CoreState::refresh`].
    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    // ── Appointment snapshot ────────────────────────────────

    /// Current snapshot. Cheap: clones the `Arc`, not the list.
    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        self.appointments
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| CoreError::LockPoisoned)
    }

    /// Ingest `records` and publish them as the new snapshot.
    pub fn replace_appointments(&self, records: Vec<Appointment>) -> Result<usize, CoreError> {
        let ingested = ingest_all(records);
        let count = ingested.len();
        let mut guard = self
            .appointments
            .write()
            .map_err(|_| CoreError::LockPoisoned)?;
        *guard = Arc::new(ingested);
        Ok(count)
    }

    /// Reload from the configured source.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let source = self.source.as_ref().ok_or(CoreError::NoSource)?;
        let records = source.fetch_appointments().await?;
        let count = self.replace_appointments(records)?;
        tracing::info!(count, source = %source.describe(), "Appointments loaded");
        Ok(count)
    }

    /// Cancel or check in an appointment.
    ///
    /// The transition is validated against the current snapshot first. A
    /// cancel is forwarded to the backend when one is configured; the local
    /// snapshot is only replaced once that call succeeded.
    pub async fn transition(
        &self,
        id: &str,
        action: StatusAction,
    ) -> Result<ScheduledAppointment, CoreError> {
        schedule::apply_action(&self.snapshot()?, id, action)?;

        if action == StatusAction::Cancel {
            if let Some(client) = self.source.as_ref().and_then(DataSource::backend) {
                client.cancel(id).await?;
            }
        }

        let mut guard = self
            .appointments
            .write()
            .map_err(|_| CoreError::LockPoisoned)?;
        let updated = schedule::apply_action(&guard, id, action)?;
        let next: Vec<ScheduledAppointment> = guard
            .iter()
            .map(|a| if a.id() == id { updated.clone() } else { a.clone() })
            .collect();
        *guard = Arc::new(next);

        tracing::info!(id, status = updated.status().as_str(), "Appointment status changed");
        Ok(updated)
    }

    // ── Session ─────────────────────────────────────────────

    pub fn auth_events(&self) -> &AuthEvents {
        &self.auth_events
    }

    /// Owned copy of the active session, if any.
    pub fn session(&self) -> Result<Option<Session>, CoreError> {
        self.session
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| CoreError::LockPoisoned)
    }

    pub fn require_session(&self) -> Result<Session, CoreError> {
        self.session()?.ok_or(CoreError::NoActiveSession)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Replace the active session and notify listeners.
    pub fn sign_in(&self, session: Session) -> Result<(), CoreError> {
        {
            let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
            *guard = Some(session.clone());
        }
        tracing::info!(role = session.role.as_str(), "Session started");
        self.auth_events.emit(&AuthEvent::SignedIn(session));
        Ok(())
    }

    /// Clear the session. Listeners are only notified when there was one.
    pub fn sign_out(&self) -> Result<Option<Session>, CoreError> {
        let previous = {
            let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
            guard.take()
        };
        if let Some(session) = &previous {
            tracing::info!("Session ended");
            self.auth_events.emit(&AuthEvent::SignedOut {
                user_id: session.user_id.clone(),
            });
        }
        Ok(previous)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new(TimelineConfig::default(), WeekStart::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active session")]
    NoActiveSession,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("No appointment source configured")]
    NoSource,
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Appointment source error: {0}")]
    Source(#[from] ClientError),
}

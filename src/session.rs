//! Signed-in session and the auth-state observable.
//!
//! The session is a plain value handed to whoever needs it. Components that
//! react to sign-in / sign-out register a listener on `AuthEvents` and keep
//! the returned id to unregister later.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Authenticated user as returned by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    /// Patient record the session is scoped to (self for patients, the
    /// child for parents).
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub access_token: String,
}

impl Session {
    /// Whether this session may read `patient_id`'s appointments.
    ///
    /// Clinical staff see everyone; patients and parents only the patient
    /// the session is scoped to.
    pub fn can_view_patient(&self, patient_id: &str) -> bool {
        self.role.sees_full_schedule() || self.patient_id.as_deref() == Some(patient_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut { user_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Listener registry for auth-state changes.
#[derive(Default)]
pub struct AuthEvents {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl AuthEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push((id, Arc::new(listener))),
            Err(_) => tracing::error!("Auth listener registry lock poisoned"),
        }
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut listeners) = self.listeners.lock() else {
            tracing::error!("Auth listener registry lock poisoned");
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver `event` to every listener. Listeners run outside the lock so
    /// they may subscribe or unsubscribe themselves.
    pub fn emit(&self, event: &AuthEvent) {
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => {
                tracing::error!("Auth listener registry lock poisoned");
                return;
            }
        };
        for listener in snapshot {
            listener(event);
        }
    }
}

impl std::fmt::Debug for AuthEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

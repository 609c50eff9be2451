//! Appointment list endpoints.
//!
//! - `GET /api/appointments?tab=&patient_id=` lists one tab
//! - `GET /api/appointments/agenda?doctor=&date=` is a doctor's day
//! - `POST /api/appointments/refresh` reloads from the source
//! - `POST /api/appointments/:id/cancel` and `/complete` change status

use std::borrow::Cow;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{visible_to, ApiContext, AppointmentView};
use crate::calendar::parse_view_date;
use crate::models::ScheduledAppointment;
use crate::schedule::{self, ListTab, ScheduleError, StatusAction};
use crate::session::Session;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub tab: ListTab,
    pub patient_id: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub tab: ListTab,
    pub count: usize,
    pub appointments: Vec<AppointmentView>,
}

/// `GET /api/appointments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let Query(query) = query?;
    let snapshot = ctx.core.snapshot()?;
    let visible = visible_to(&session, &snapshot);

    let scoped: Cow<'_, [ScheduledAppointment]> = match &query.patient_id {
        Some(patient_id) => {
            if !session.can_view_patient(patient_id) {
                return Err(ApiError::Forbidden(format!(
                    "Not allowed to view appointments of {patient_id}"
                )));
            }
            Cow::Owned(
                schedule::for_patient(&visible, patient_id)
                    .into_iter()
                    .cloned()
                    .collect(),
            )
        }
        None => visible,
    };

    let appointments: Vec<AppointmentView> = schedule::partition(&scoped, query.tab)
        .into_iter()
        .cloned()
        .map(AppointmentView::from)
        .collect();

    Ok(Json(AppointmentsResponse {
        tab: query.tab,
        count: appointments.len(),
        appointments,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub doctor: String,
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct AgendaResponse {
    pub doctor: String,
    pub date: chrono::NaiveDate,
    pub appointments: Vec<AppointmentView>,
}

/// `GET /api/appointments/agenda`
pub async fn agenda(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    query: Result<Query<AgendaQuery>, QueryRejection>,
) -> Result<Json<AgendaResponse>, ApiError> {
    let Query(query) = query?;
    let date = match query.date.as_deref() {
        Some(raw) => parse_view_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let snapshot = ctx.core.snapshot()?;
    let visible = visible_to(&session, &snapshot);
    let appointments = schedule::agenda_for(&visible, &query.doctor, date)
        .into_iter()
        .cloned()
        .map(AppointmentView::from)
        .collect();

    Ok(Json(AgendaResponse {
        doctor: query.doctor,
        date,
        appointments,
    }))
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

/// `POST /api/appointments/refresh`
pub async fn refresh(State(ctx): State<ApiContext>) -> Result<Json<RefreshResponse>, ApiError> {
    let count = ctx.core.refresh().await?;
    Ok(Json(RefreshResponse { count }))
}

/// `POST /api/appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, ApiError> {
    change_status(&ctx, &session, &id, StatusAction::Cancel).await
}

/// `POST /api/appointments/:id/complete` (check-in)
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, ApiError> {
    if !session.role.sees_full_schedule() {
        return Err(ApiError::Forbidden(
            "Only clinical staff can check in appointments".into(),
        ));
    }
    change_status(&ctx, &session, &id, StatusAction::Complete).await
}

async fn change_status(
    ctx: &ApiContext,
    session: &Session,
    id: &str,
    action: StatusAction,
) -> Result<Json<AppointmentView>, ApiError> {
    // Records outside the session's scope look the same as missing ones.
    let in_scope = {
        let snapshot = ctx.core.snapshot()?;
        let visible = visible_to(session, &snapshot);
        visible.iter().any(|a| a.id() == id)
    };
    if !in_scope {
        return Err(ScheduleError::NotFound(id.to_string()).into());
    }

    let updated = ctx.core.transition(id, action).await?;
    Ok(Json(AppointmentView::from(updated)))
}

//! Calendar endpoints.
//!
//! - `GET /api/calendar/month?year=&month=` (default: current month)
//! - `GET /api/calendar/day?date=YYYY-MM-DD` (default: today)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{visible_to, ApiContext};
use crate::calendar::{
    build_month_grid, layout_day, parse_view_date, DayTimeline, MonthGrid, YearMonth,
    CELL_PREVIEW_LIMIT,
};
use crate::session::Session;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl From<YearMonth> for MonthRef {
    fn from(ym: YearMonth) -> Self {
        Self {
            year: ym.year(),
            month: ym.month(),
        }
    }
}

/// Cells whose preview hides appointments ("+ N more").
#[derive(Debug, Serialize)]
pub struct CellOverflow {
    pub date: NaiveDate,
    pub more: usize,
}

#[derive(Serialize)]
pub struct MonthResponse {
    #[serde(flatten)]
    pub grid: MonthGrid,
    pub prev: MonthRef,
    pub next: MonthRef,
    pub overflow: Vec<CellOverflow>,
}

/// `GET /api/calendar/month`
pub async fn month(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<MonthResponse>, ApiError> {
    let Query(query) = query?;
    let today = Local::now().date_naive();
    let target = match (query.year, query.month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)?,
        (None, None) => YearMonth::containing(today),
        _ => {
            return Err(ApiError::BadRequest(
                "year and month must be given together".into(),
            ))
        }
    };

    let snapshot = ctx.core.snapshot()?;
    let visible = visible_to(&session, &snapshot);
    let grid = build_month_grid(&visible, target, ctx.core.week_start, today);

    let overflow = grid
        .cells
        .iter()
        .filter_map(|cell| {
            let preview = cell.preview(CELL_PREVIEW_LIMIT);
            (preview.overflow > 0).then_some(CellOverflow {
                date: cell.date,
                more: preview.overflow,
            })
        })
        .collect();

    Ok(Json(MonthResponse {
        grid,
        prev: target.prev().into(),
        next: target.next().into(),
        overflow,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// `GET /api/calendar/day`
pub async fn day(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Json<DayTimeline>, ApiError> {
    let Query(query) = query?;
    let now = Local::now().naive_local();
    let date = match query.date.as_deref() {
        Some(raw) => parse_view_date(raw)?,
        None => now.date(),
    };

    let snapshot = ctx.core.snapshot()?;
    let visible = visible_to(&session, &snapshot);
    Ok(Json(layout_day(&visible, date, now, &ctx.core.timeline)))
}

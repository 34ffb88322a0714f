//! HTTP handlers for the calendar surface.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::anilist::model::AiringSchedule;
use crate::calendar::event::{AiringEvent, TimeStep};
use crate::calendar::range::{calendar_range, RangeKind};
use crate::cms::SimuldubItem;
use crate::errors::AppError;
use crate::layout::{compute_layout, EventLayout, MeasuredBox};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub airing_at_greater: i64,
    pub airing_at_lesser: i64,
    /// ISO dates bounding the simuldub window.
    pub range_start: String,
    pub range_end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub airing_schedules: Vec<AiringSchedule>,
    pub simuldubs: Vec<SimuldubItem>,
}

/// GET /api/v1/calendar
///
/// Airing schedules and simuldub records for the dashboard's current view,
/// fetched concurrently.
pub async fn handle_calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    validate_window(params.airing_at_greater, params.airing_at_lesser)?;
    if params.range_start.is_empty() || params.range_end.is_empty() {
        return Err(AppError::Validation(
            "rangeStart and rangeEnd are required".to_string(),
        ));
    }

    let (airing_schedules, simuldubs) = tokio::join!(
        state
            .schedules
            .schedules_between(params.airing_at_greater, params.airing_at_lesser),
        state
            .cms
            .simuldubs_between(&params.range_start, &params.range_end),
    );
    let simuldubs = simuldubs.map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Json(CalendarResponse {
        airing_schedules,
        simuldubs,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    #[serde(default)]
    pub airing_at_greater: Option<i64>,
    #[serde(default)]
    pub airing_at_lesser: Option<i64>,
    /// Named view window, used when explicit bounds are absent.
    #[serde(default)]
    pub range: Option<RangeKind>,
    /// Reference date for the named window; today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_step: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub time_step: TimeStep,
    pub events: Vec<AiringEvent>,
}

/// GET /api/v1/calendar/events
///
/// The airing window assembled into ready-to-render event cards. The window
/// is either explicit timestamps or a named week/month/year view.
pub async fn handle_events(
    State(state): State<AppState>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, AppError> {
    let (airing_at_greater, airing_at_lesser) = resolve_window(&params)?;

    let schedules = state
        .schedules
        .schedules_between(airing_at_greater, airing_at_lesser)
        .await;
    let events = schedules.iter().map(AiringEvent::from_schedule).collect();

    Ok(Json(EventsResponse {
        time_step: params.time_step.map(TimeStep::new).unwrap_or_default(),
        events,
    }))
}

fn resolve_window(params: &EventsQuery) -> Result<(i64, i64), AppError> {
    match (
        params.airing_at_greater,
        params.airing_at_lesser,
        params.range,
    ) {
        (Some(greater), Some(lesser), _) => {
            validate_window(greater, lesser)?;
            Ok((greater, lesser))
        }
        (None, None, Some(kind)) => {
            let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
            let range = calendar_range(kind, date);
            Ok((range.start, range.end))
        }
        _ => Err(AppError::Validation(
            "provide airingAtGreater and airingAtLesser, or a named range".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreviewRequest {
    #[serde(default)]
    pub time_step: Option<u32>,
    pub cards: Vec<LayoutPreviewCard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreviewCard {
    /// Measured pixel width; omitted means unmeasured.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    pub duration_minutes: f64,
    pub title_length: usize,
}

#[derive(Debug, Serialize)]
pub struct LayoutPreviewResponse {
    pub layouts: Vec<EventLayout>,
}

/// POST /api/v1/layout/preview
///
/// Batch layout decisions for measured cards. This is where raw numeric
/// input is normalized for the engine: missing or NaN dimensions become the
/// unmeasured sentinel, NaN durations become zero.
pub async fn handle_layout_preview(
    State(state): State<AppState>,
    Json(request): Json<LayoutPreviewRequest>,
) -> Json<LayoutPreviewResponse> {
    let step = request.time_step.map(TimeStep::new).unwrap_or_default();
    let layouts = request
        .cards
        .iter()
        .map(|card| {
            let bx = MeasuredBox::new(
                normalize_dimension(card.width),
                normalize_dimension(card.height),
            );
            let duration = if card.duration_minutes.is_nan() {
                0.0
            } else {
                card.duration_minutes
            };
            compute_layout(
                bx,
                duration,
                f64::from(step.minutes()),
                card.title_length,
                &state.layout_tuning,
            )
        })
        .collect();
    Json(LayoutPreviewResponse { layouts })
}

fn normalize_dimension(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => f64::INFINITY,
    }
}

fn validate_window(airing_at_greater: i64, airing_at_lesser: i64) -> Result<(), AppError> {
    if airing_at_lesser <= airing_at_greater {
        return Err(AppError::Validation(
            "airingAtLesser must be after airingAtGreater".to_string(),
        ));
    }
    Ok(())
}

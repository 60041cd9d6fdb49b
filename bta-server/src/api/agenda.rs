//! Agenda export endpoints
//!
//! `/ical` (alias `/ics`), `/json`, `/xml` and `/csv` all run the same
//! pipeline and differ only in the renderer. Responses are cached by
//! the full request URL; a hit returns the stored bytes unchanged.

use crate::cache::CachedResponse;
use crate::error::ApiResult;
use crate::planner::AgendaQuery;
use crate::render::{render, Format, IcalOptions};
use crate::AppState;
use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;

/// Query parameters shared by all export formats; the `na*`/`showSW`
/// switches only affect the calendar format.
#[derive(Debug, Default, Deserialize)]
pub struct AgendaParams {
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub status: Option<String>,
    /// Include roll-call-vote follow-up events
    #[serde(default)]
    pub na: bool,
    /// Attach alarms to roll-call events (only effective with `na`)
    #[serde(default, rename = "naAlarm")]
    pub na_alarm: bool,
    /// Include all-day session-week markers
    #[serde(default, rename = "showSW")]
    pub show_sw: bool,
}

pub fn agenda_routes() -> Router<AppState> {
    Router::new()
        .route("/ical", get(serve_ical))
        .route("/ics", get(serve_ical))
        .route("/json", get(serve_json))
        .route("/xml", get(serve_xml))
        .route("/csv", get(serve_csv))
}

async fn serve_ical(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AgendaParams>,
) -> ApiResult<Response> {
    serve_agenda(&state, &uri, Format::Ical, params).await
}

async fn serve_json(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AgendaParams>,
) -> ApiResult<Response> {
    serve_agenda(&state, &uri, Format::Json, params).await
}

async fn serve_xml(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AgendaParams>,
) -> ApiResult<Response> {
    serve_agenda(&state, &uri, Format::Xml, params).await
}

async fn serve_csv(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<AgendaParams>,
) -> ApiResult<Response> {
    serve_agenda(&state, &uri, Format::Csv, params).await
}

async fn serve_agenda(
    state: &AppState,
    uri: &Uri,
    format: Format,
    params: AgendaParams,
) -> ApiResult<Response> {
    let cache_key = uri.to_string();
    match state.cache.lookup(&cache_key).await {
        Ok(Some(hit)) => return Ok(cached_response(hit, state.cache.agenda_ttl_secs())),
        Ok(None) => {}
        Err(err) => warn!(%err, "response cache lookup failed, rendering fresh"),
    }

    let query = AgendaQuery {
        year: params.year,
        week: params.week,
        month: params.month,
        day: params.day,
        status: params.status,
    };
    let items = state.service.resolve(&query).await?;

    let options = IcalOptions {
        roll_call_events: params.na,
        roll_call_alarms: params.na_alarm,
        session_week_markers: params.show_sw,
    };
    let body = render(format, &items, &options)?;

    let response = CachedResponse {
        body,
        content_type: format.content_type().to_string(),
    };
    if let Err(err) = state.cache.store_agenda(&cache_key, &response).await {
        warn!(%err, "failed to cache rendered response");
    }

    Ok(cached_response(response, state.cache.agenda_ttl_secs()))
}

pub(super) fn cached_response(response: CachedResponse, max_age: i64) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, response.content_type),
            (header::CACHE_CONTROL, format!("max-age={max_age}")),
        ],
        response.body,
    )
        .into_response()
}

use axum::extract::Path;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::{Local, NaiveDate};
use futures::try_join;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::verify_token,
    error::ApiError,
    models::{MemberPackage, PersonRef, ScheduledSession, SessionCreate, SessionUpdate},
    timeline::{DayTimeline, layout_day},
    validation::validate_duration,
};

#[derive(Debug, serde::Deserialize)]
pub struct TimelineQuery {
    pub date: Option<NaiveDate>,
    pub token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct SlotQuery {
    pub date: Option<NaiveDate>,
    pub offset_px: f64,
    pub token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// The laid-out day plus everything the booking form needs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimelineResponse {
    pub timeline: DayTimeline,
    pub trainers: Vec<PersonRef>,
    /// Member packages with remaining credit, eligible for booking.
    pub booking_packages: Vec<MemberPackage>,
}

/// A click on empty timeline area resolved to a bookable start time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotSuggestion {
    #[schema(value_type = String, format = "date-time", example = "2024-06-10T09:30:00")]
    pub scheduled_at: chrono::NaiveDateTime,
    pub snap_minutes: u32,
}

#[utoipa::path(get, path = "/", tag = "timeline")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Studio Timeline API",
        "endpoints": {
            "/timeline": "Laid-out day timeline with booking options",
            "/timeline/slot": "Resolve a click offset to a bookable slot",
            "/timeline.ical": "Download a day plan as an iCal file",
            "/sessions": "Create, update and delete sessions"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "timeline")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "timeline")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/timeline",
    params(
        ("date" = Option<String>, Query, description = "Calendar day (YYYY-MM-DD), defaults to today"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Laid-out day timeline", body = TimelineResponse),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "timeline"
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<TimelineQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let now = Local::now().naive_local();
    let date = query.date.unwrap_or_else(|| now.date());

    let ctx = state.session.context()?;
    let (sessions, trainers, packages) = try_join!(
        state.directory.list_sessions(&ctx, date),
        state.directory.list_trainers(&ctx),
        state.directory.list_member_packages(&ctx),
    )?;

    let timeline = layout_day(&state.settings.geometry(), date, &sessions, &packages, now);
    let booking_packages = packages
        .into_iter()
        .filter(|mp| mp.sessions_remaining > 0)
        .collect();

    Ok(Json(TimelineResponse {
        timeline,
        trainers,
        booking_packages,
    }))
}

#[utoipa::path(
    get,
    path = "/timeline/slot",
    params(
        ("date" = Option<String>, Query, description = "Calendar day (YYYY-MM-DD), defaults to today"),
        ("offset_px" = f64, Query, description = "Click offset from the timeline content origin"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Snapped, clamped candidate start time", body = SlotSuggestion),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "timeline"
)]
pub async fn resolve_slot(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<SlotQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let geometry = state.settings.geometry();
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let slot = geometry.offset_to_time(query.offset_px);

    Ok(Json(SlotSuggestion {
        scheduled_at: date.and_time(slot),
        snap_minutes: geometry.snap_minutes,
    }))
}

#[utoipa::path(
    post,
    path = "/sessions",
    request_body = SessionCreate,
    responses(
        (status = 201, description = "Created session", body = ScheduledSession),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<TokenQuery>,
    Json(payload): Json<SessionCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;
    validate_duration(payload.duration_minutes)?;

    let ctx = state.session.context()?;
    let created = state.directory.create_session(&ctx, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    request_body = SessionUpdate,
    responses(
        (status = 200, description = "Updated session", body = ScheduledSession),
        (status = 404, description = "Session not found"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "sessions"
)]
pub async fn update_session(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<TokenQuery>,
    Path(id): Path<String>,
    Json(payload): Json<SessionUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;
    if let Some(duration) = payload.duration_minutes {
        validate_duration(duration)?;
    }

    let ctx = state.session.context()?;
    let updated = state.directory.update_session(&ctx, &id, &payload).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<TokenQuery>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let ctx = state.session.context()?;
    state.directory.delete_session(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/timeline.ical",
    params(
        ("date" = Option<String>, Query, description = "Calendar day (YYYY-MM-DD), defaults to today"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No sessions found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "timeline"
)]
pub async fn get_ical(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<TimelineQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let ctx = state.session.context()?;
    let sessions = state.directory.list_sessions(&ctx, date).await?;

    if sessions.is_empty() {
        return Err(ApiError::NotFound("No sessions found".into()));
    }

    let body = state.exporter.generate(&sessions);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=studio_day_plan.ics",
            ),
        ],
        body,
    ))
}

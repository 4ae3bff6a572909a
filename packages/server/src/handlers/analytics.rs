use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Datelike, Utc};
use common::TimeRange;
use tracing::instrument;

use crate::analytics::AnalyticsService;
use crate::analytics::service::NewEvent;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::client_info::ClientInfo;
use crate::extractors::json::AppJson;
use crate::models::analytics::{
    CategoryBreakdownResponse, MonthlyQuery, MonthlyResponse, OverviewResponse, RangeQuery,
    RecentActivityQuery, RecentActivityResponse, TopAssetsQuery, TopAssetsResponse, TrackRequest,
    TrackResponse, validate_track_request,
};
use crate::state::AppState;

const TOP_ASSETS_DEFAULT: u64 = 10;
const RECENT_ACTIVITY_DEFAULT: u64 = 20;
const MAX_LIMIT: u64 = 100;

#[utoipa::path(
    post,
    path = "/api/v1/analytics/track",
    tag = "Analytics",
    operation_id = "trackEvent",
    summary = "Record an interaction with an asset",
    description = "Appends an event to the log. The actor is taken from the bearer token when \
        a valid one is sent, otherwise the event is anonymous. Client address, user agent and \
        referrer come from the request. Asset view and download counters are not changed.",
    request_body = TrackRequest,
    responses(
        (status = 201, description = "Event recorded", body = TrackResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(
    skip(state, auth_user, client, payload),
    fields(asset_id = payload.asset_id, event_type = %payload.event_type)
)]
pub async fn track(
    auth_user: Option<AuthUser>,
    client: ClientInfo,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TrackRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_track_request(&payload)?;

    let event = NewEvent {
        asset_id: payload.asset_id,
        event_type: payload.event_type,
        user_id: auth_user.map(|u| u.user_id),
        session_id: payload.session_id,
        metadata: payload
            .metadata
            .filter(|m| !m.is_null())
            .unwrap_or_else(|| serde_json::json!({})),
        client,
    };

    AnalyticsService::new(&state.db)
        .track(event, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(TrackResponse {
            success: true,
            message: "Analytics tracked successfully".into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/overview",
    tag = "Analytics",
    operation_id = "getAnalyticsOverview",
    summary = "Totals for the selected window",
    description = "Views, downloads, likes, shares and estimated earnings in the window, with \
        the percentage change against the preceding window of the same length. \
        `totalAssets` counts all of the caller's assets.",
    params(RangeQuery),
    responses(
        (status = 200, description = "Overview", body = OverviewResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn overview(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<OverviewResponse>, AppError> {
    auth_user.require_creator()?;
    let range = TimeRange::parse_or_default(query.time_range.as_deref());

    let response = AnalyticsService::new(&state.db)
        .overview(auth_user.user_id, range, Utc::now())
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/monthly",
    tag = "Analytics",
    operation_id = "getMonthlyAnalytics",
    summary = "Per-month views, downloads and earnings",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Twelve monthly buckets", body = MonthlyResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn monthly(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<MonthlyResponse>, AppError> {
    auth_user.require_creator()?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let monthly_stats = AnalyticsService::new(&state.db)
        .monthly(auth_user.user_id, year)
        .await?;
    Ok(Json(MonthlyResponse {
        year,
        monthly_stats,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/top-assets",
    tag = "Analytics",
    operation_id = "getTopAssets",
    summary = "Best performing assets in the window",
    description = "Ordered by downloads, then views. Default limit 10, maximum 100.",
    params(TopAssetsQuery),
    responses(
        (status = 200, description = "Top assets", body = TopAssetsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn top_assets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TopAssetsQuery>,
) -> Result<Json<TopAssetsResponse>, AppError> {
    auth_user.require_creator()?;
    let range = TimeRange::parse_or_default(query.time_range.as_deref());
    let limit = query.limit.unwrap_or(TOP_ASSETS_DEFAULT).clamp(1, MAX_LIMIT);

    let top_assets = AnalyticsService::new(&state.db)
        .top_assets(auth_user.user_id, range, limit as usize, Utc::now())
        .await?;
    Ok(Json(TopAssetsResponse { top_assets }))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/category-breakdown",
    tag = "Analytics",
    operation_id = "getCategoryBreakdown",
    summary = "Activity per asset category in the window",
    params(RangeQuery),
    responses(
        (status = 200, description = "Per-category figures", body = CategoryBreakdownResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn category_breakdown(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CategoryBreakdownResponse>, AppError> {
    auth_user.require_creator()?;
    let range = TimeRange::parse_or_default(query.time_range.as_deref());

    let category_breakdown = AnalyticsService::new(&state.db)
        .category_breakdown(auth_user.user_id, range, Utc::now())
        .await?;
    Ok(Json(CategoryBreakdownResponse { category_breakdown }))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/recent-activity",
    tag = "Analytics",
    operation_id = "getRecentActivity",
    summary = "Latest events on the caller's assets",
    description = "Newest first regardless of time range. Default limit 20, maximum 100.",
    params(RecentActivityQuery),
    responses(
        (status = 200, description = "Recent events", body = RecentActivityResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn recent_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RecentActivityQuery>,
) -> Result<Json<RecentActivityResponse>, AppError> {
    auth_user.require_creator()?;
    let limit = query.limit.unwrap_or(RECENT_ACTIVITY_DEFAULT).clamp(1, MAX_LIMIT);

    let recent_activity = AnalyticsService::new(&state.db)
        .recent_activity(auth_user.user_id, limit, Utc::now())
        .await?;
    Ok(Json(RecentActivityResponse { recent_activity }))
}

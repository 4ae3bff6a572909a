use chrono::{DateTime, Utc};
use common::{AssetCategory, EventType};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for recording an analytics event.
///
/// The acting user is taken from the bearer token when one is sent.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[schema(example = 7)]
    pub asset_id: i32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub session_id: Option<String>,
    /// Free-form JSON object stored with the event.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

pub fn validate_track_request(payload: &TrackRequest) -> Result<(), AppError> {
    if let Some(metadata) = &payload.metadata
        && !metadata.is_object()
        && !metadata.is_null()
    {
        return Err(AppError::Validation("metadata must be a JSON object".into()));
    }
    if payload
        .session_id
        .as_deref()
        .is_some_and(|s| s.chars().count() > 128)
    {
        return Err(AppError::Validation(
            "sessionId must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TrackResponse {
    pub success: bool,
    #[schema(example = "Analytics tracked successfully")]
    pub message: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    /// `7d`, `30d`, `90d` or `1y`. Anything else means `30d`.
    pub time_range: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MonthlyQuery {
    /// Calendar year (UTC). Defaults to the current year.
    pub year: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TopAssetsQuery {
    pub limit: Option<u64>,
    pub time_range: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecentActivityQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTotals {
    pub total_assets: u64,
    pub total_views: i64,
    pub total_downloads: i64,
    pub total_likes: i64,
    pub total_shares: i64,
    pub total_earnings: f64,
    /// Not tracked yet; always `null`.
    pub followers: Option<i64>,
}

/// Percentage change against the previous window of the same length.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OverviewChanges {
    pub views: f64,
    pub downloads: f64,
    pub likes: f64,
    pub shares: f64,
    pub earnings: f64,
    /// Not tracked yet; always `null`.
    pub followers: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    #[schema(example = "30d")]
    pub time_range: String,
    pub overview: OverviewTotals,
    pub changes: OverviewChanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct MonthlyStat {
    #[schema(example = "Jan")]
    pub month: &'static str,
    pub views: i64,
    pub downloads: i64,
    pub earnings: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResponse {
    pub year: i32,
    pub monthly_stats: Vec<MonthlyStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TopAsset {
    pub id: i32,
    pub title: String,
    pub views: i64,
    pub downloads: i64,
    pub likes: i64,
    pub earnings: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopAssetsResponse {
    pub top_assets: Vec<TopAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CategoryStat {
    pub category: AssetCategory,
    /// Distinct assets with at least one event in the window.
    pub assets: u64,
    pub views: i64,
    pub downloads: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownResponse {
    pub category_breakdown: Vec<CategoryStat>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActivityItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Asset title, or `Unknown Asset` when it no longer exists.
    pub asset: String,
    /// Actor display name, or `Anonymous`.
    pub user: String,
    #[schema(example = "5 minutes ago")]
    pub time: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityResponse {
    pub recent_activity: Vec<ActivityItem>,
}

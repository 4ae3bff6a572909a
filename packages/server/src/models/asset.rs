use chrono::{DateTime, Utc};
use common::{AssetCategory, AssetFormats, AssetStatus};
use serde::{Deserialize, Serialize};

use crate::entity::asset::{self, FileDescriptor};
use crate::entity::user;
use crate::error::{AppError, FieldError};
use crate::ingest::form::{DESCRIPTION_MAX, TAGS_MAX, TITLE_MAX, check_length};
use crate::models::auth::into_result;

pub use super::shared::Pagination;

/// Creator fields embedded in asset listings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub username: Option<String>,
    pub profile_image: Option<String>,
}

impl From<&user::Model> for CreatorSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Rating {
    pub average: f64,
    pub count: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub creator_id: i32,
    /// Present when the creator account still exists and was loaded.
    pub creator: Option<CreatorSummary>,
    #[schema(example = "Neon Logo Pack")]
    pub title: String,
    pub description: String,
    #[schema(example = "logo,neon,retro")]
    pub tags: String,
    pub category: AssetCategory,
    #[schema(example = "100px")]
    pub width: String,
    #[schema(example = "100px")]
    pub height: String,
    pub credit: bool,
    pub formats: AssetFormats,
    pub main_file: Option<FileDescriptor>,
    pub cover_images: Vec<FileDescriptor>,
    pub status: AssetStatus,
    pub views: i64,
    pub downloads: i64,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetResponse {
    pub fn new(asset: asset::Model, creator: Option<&user::Model>) -> Self {
        Self {
            formats: asset.formats(),
            main_file: asset.main_file().ok(),
            cover_images: asset.cover_images().unwrap_or_default(),
            id: asset.id,
            creator_id: asset.creator_id,
            creator: creator.map(CreatorSummary::from),
            title: asset.title,
            description: asset.description,
            tags: asset.tags,
            category: asset.category,
            width: asset.width,
            height: asset.height,
            credit: asset.credit,
            status: asset.status,
            views: asset.views,
            downloads: asset.downloads,
            rating: Rating {
                average: asset.rating_average,
                count: asset.rating_count,
            },
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssetListResponse {
    pub assets: Vec<AssetResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AssetListQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size (max 100).
    pub limit: Option<u64>,
}

/// Partial update of an asset's metadata. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateAssetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub category: Option<AssetCategory>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub credit: Option<bool>,
    pub formats: Option<AssetFormats>,
    pub status: Option<AssetStatus>,
}

pub fn validate_update_asset_request(payload: &UpdateAssetRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if let Some(title) = &payload.title {
        check_length(&mut errors, "title", title, TITLE_MAX, "Title");
    }
    if let Some(description) = &payload.description {
        check_length(
            &mut errors,
            "description",
            description,
            DESCRIPTION_MAX,
            "Description",
        );
    }
    if let Some(tags) = &payload.tags {
        check_length(&mut errors, "tags", tags, TAGS_MAX, "Tags");
    }
    if payload.width.as_deref().is_some_and(|w| w.trim().is_empty()) {
        errors.push(FieldError::new("width", "Width is required"));
    }
    if payload.height.as_deref().is_some_and(|h| h.trim().is_empty()) {
        errors.push(FieldError::new("height", "Height is required"));
    }
    if payload.formats.is_some_and(|f| !f.any()) {
        errors.push(FieldError::new(
            "formats",
            "At least one format must be selected",
        ));
    }
    into_result(errors)
}

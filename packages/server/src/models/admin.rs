use common::UserRole;
use serde::{Deserialize, Serialize};

use crate::models::asset::AssetResponse;
use crate::models::auth::UserResponse;
use crate::models::shared::Pagination;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AdminUserQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive match on name, email or username.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminUserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AdminAssetQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive match on title or tags.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminAssetListResponse {
    pub assets: Vec<AssetResponse>,
    pub pagination: Pagination,
}

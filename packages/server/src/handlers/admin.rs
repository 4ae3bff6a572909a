use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{AssetCategory, AssetStatus, UserRole};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{asset, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::assets::{apply_asset_update, find_asset, paginate_assets};
use crate::ingest::{self, profile::discard_in_background, remove_asset_files};
use crate::models::admin::{
    AdminAssetListResponse, AdminAssetQuery, AdminUserListResponse, AdminUserQuery,
    UpdateRoleRequest,
};
use crate::models::asset::{AssetResponse, UpdateAssetRequest, validate_update_asset_request};
use crate::models::auth::UserResponse;
use crate::models::shared::{Pagination, escape_like, page_offset, page_params};
use crate::state::AppState;

const ADMIN_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Case-insensitive substring match on a text column.
fn contains_ci<C: ColumnTrait>(column: C, term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\')),
    )
}

fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    operation_id = "adminListUsers",
    summary = "List accounts",
    description = "Newest first. `search` matches name, email or username case-insensitively. \
        Default page size 20, maximum 100.",
    params(AdminUserQuery),
    responses(
        (status = 200, description = "Accounts", body = AdminUserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminUserQuery>,
) -> Result<Json<AdminUserListResponse>, AppError> {
    auth_user.require_admin()?;
    let (page, limit) = page_params(query.page, query.limit, ADMIN_PAGE_SIZE, MAX_PAGE_SIZE);

    let mut select = user::Entity::find();
    if let Some(term) = search_term(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(user::Column::Name, term))
                .add(contains_ci(user::Column::Email, term))
                .add(contains_ci(user::Column::Username, term)),
        );
    }

    let total = select.clone().paginate(&state.db, limit).num_items().await?;
    let users = select
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .offset(Some(page_offset(page, limit)))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(AdminUserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        pagination: Pagination::new(page, limit, total),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    tag = "Admin",
    operation_id = "adminUpdateUserRole",
    summary = "Change an account's role",
    description = "Admins cannot demote themselves.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Self-demotion (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, role = %payload.role))]
pub async fn update_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;
    if id == auth_user.user_id && payload.role != UserRole::Admin {
        return Err(AppError::BadRequest("Admins cannot demote themselves".into()));
    }

    let target = find_user(&state.db, id).await?;
    let mut active = target.into_active_model();
    active.role = Set(payload.role);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    tracing::info!(user_id = id, role = %updated.role, "Role changed");
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "adminDeleteUser",
    summary = "Delete an account and its assets",
    description = "Removes the account and every asset it owns, then their stored files and \
        the profile image. Admins cannot delete themselves. Analytics history is kept.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Self-deletion (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;
    if id == auth_user.user_id {
        return Err(AppError::BadRequest("Admins cannot delete themselves".into()));
    }

    let target = find_user(&state.db, id).await?;
    let owned = asset::Entity::find()
        .filter(asset::Column::CreatorId.eq(id))
        .all(&state.db)
        .await?;

    let txn = state.db.begin().await?;
    asset::Entity::delete_many()
        .filter(asset::Column::CreatorId.eq(id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    for model in &owned {
        remove_asset_files(&*state.blob_store, model).await;
    }
    if let Some(image) = target.profile_image {
        discard_in_background(state.blob_store.clone(), image);
    }

    tracing::info!(user_id = id, assets = owned.len(), "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/assets",
    tag = "Admin",
    operation_id = "adminListAssets",
    summary = "List all assets",
    description = "Newest first, any status. Filter by `status` and `category`; `search` \
        matches title or tags case-insensitively. Default page size 20, maximum 100.",
    params(AdminAssetQuery),
    responses(
        (status = 200, description = "Assets", body = AdminAssetListResponse),
        (status = 400, description = "Unknown status or category (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_assets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminAssetQuery>,
) -> Result<Json<AdminAssetListResponse>, AppError> {
    auth_user.require_admin()?;
    let (page, limit) = page_params(query.page, query.limit, ADMIN_PAGE_SIZE, MAX_PAGE_SIZE);

    let mut select = asset::Entity::find();
    if let Some(raw) = search_term(query.status.as_deref()) {
        let status: AssetStatus = raw
            .parse()
            .map_err(|e: common::ParseEnumError| AppError::Validation(e.to_string()))?;
        select = select.filter(asset::Column::Status.eq(status));
    }
    if let Some(raw) = search_term(query.category.as_deref()) {
        let category: AssetCategory = raw
            .parse()
            .map_err(|e: common::ParseEnumError| AppError::Validation(e.to_string()))?;
        select = select.filter(asset::Column::Category.eq(category));
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(contains_ci(asset::Column::Title, term))
                .add(contains_ci(asset::Column::Tags, term)),
        );
    }

    let listing = paginate_assets(&state.db, select, page, limit).await?;
    Ok(Json(AdminAssetListResponse {
        assets: listing.assets,
        pagination: listing.pagination,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/assets/{id}",
    tag = "Admin",
    operation_id = "adminUpdateAsset",
    summary = "Update any asset",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_asset_request(&payload)?;

    let model = find_asset(&state.db, id).await?;
    let updated = apply_asset_update(&state.db, model, payload).await?;
    let creator = user::Entity::find_by_id(updated.creator_id).one(&state.db).await?;
    Ok(Json(AssetResponse::new(updated, creator.as_ref())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/assets/{id}",
    tag = "Admin",
    operation_id = "adminDeleteAsset",
    summary = "Delete any asset",
    description = "Removes the asset, then its stored files. File removal is best-effort.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not an admin (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_admin()?;

    let model = find_asset(&state.db, id).await?;
    ingest::delete_asset(&state.db, &*state.blob_store, model).await?;
    tracing::info!(asset_id = id, "Asset deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use common::AssetStatus;
use common::storage::BlobKey;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::{asset, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::ingest::staging::Staging;
use crate::ingest::{self, Counter};
use crate::models::asset::{
    AssetListQuery, AssetListResponse, AssetResponse, UpdateAssetRequest,
    validate_update_asset_request,
};
use crate::models::shared::{Pagination, page_offset, page_params};
use crate::state::AppState;
use crate::utils::filename::{Disposition, content_disposition_value};

const PUBLIC_PAGE_SIZE: u64 = 12;
const OWNER_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const IMAGE_MAX_AGE_SECS: i64 = 31_536_000;

#[utoipa::path(
    post,
    path = "/api/v1/assets/upload",
    tag = "Assets",
    operation_id = "uploadAsset",
    summary = "Upload a new asset",
    description = "Creates an asset from a multipart form with one `mainFile`, one to four \
        `coverImages` and the metadata fields `title`, `description`, `tags`, `category`, \
        `width`, `height`, `credit` and `formats.jpg|png|psd|pdf`. Requires the creator flag. \
        Files stored before a failure are removed again.",
    request_body(content_type = "multipart/form-data", description = "Asset files and metadata"),
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, TOO_MANY_FILES)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a creator (PERMISSION_DENIED)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_creator()?;

    let mut staging = Staging::new(state.blob_store.clone());
    let created = match create_from_upload(&state, auth_user.user_id, &mut multipart, &mut staging)
        .await
    {
        Ok(model) => {
            staging.commit();
            model
        }
        Err(e) => {
            staging.compensate().await;
            return Err(e);
        }
    };

    tracing::info!(asset_id = created.id, "Asset uploaded");
    Ok((
        StatusCode::CREATED,
        Json(AssetResponse::new(created, Some(&auth_user.user))),
    ))
}

async fn create_from_upload(
    state: &AppState,
    creator_id: i32,
    multipart: &mut Multipart,
    staging: &mut Staging,
) -> Result<asset::Model, AppError> {
    let form = ingest::read_upload(multipart, staging, &state.config.storage).await?;
    let upload = form.validate().map_err(AppError::FieldErrors)?;
    let model = upload
        .into_active_model(creator_id, Utc::now())
        .insert(&state.db)
        .await?;
    Ok(model)
}

#[utoipa::path(
    get,
    path = "/api/v1/assets",
    tag = "Assets",
    operation_id = "listMyAssets",
    summary = "List the caller's assets",
    description = "Returns the caller's assets in any status, newest first. Default page size is 10.",
    params(AssetListQuery),
    responses(
        (status = 200, description = "Caller's assets", body = AssetListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_assets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<AssetListResponse>, AppError> {
    let (page, limit) = page_params(query.page, query.limit, OWNER_PAGE_SIZE, MAX_PAGE_SIZE);
    let select = asset::Entity::find().filter(asset::Column::CreatorId.eq(auth_user.user_id));
    let response = paginate_assets(&state.db, select, page, limit).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    tag = "Assets",
    operation_id = "getAsset",
    summary = "Get one of the caller's assets",
    description = "Returns an asset to its owner or an admin. Does not count as a view.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssetResponse>, AppError> {
    let model = find_asset(&state.db, id).await?;
    auth_user.require_owner_or_admin(model.creator_id)?;
    Ok(Json(with_creator(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    tag = "Assets",
    operation_id = "updateAsset",
    summary = "Update asset metadata",
    description = "Partially updates an asset. Only the owner or an admin may update it. \
        When `formats` is given at least one format must be true.",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
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
    validate_update_asset_request(&payload)?;

    let model = find_asset(&state.db, id).await?;
    auth_user.require_owner_or_admin(model.creator_id)?;

    let updated = apply_asset_update(&state.db, model, payload).await?;
    Ok(Json(with_creator(&state.db, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assets/{id}",
    tag = "Assets",
    operation_id = "deleteAsset",
    summary = "Delete an asset",
    description = "Removes the asset, then its stored files. File removal is best-effort.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
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
    let model = find_asset(&state.db, id).await?;
    auth_user.require_owner_or_admin(model.creator_id)?;

    ingest::delete_asset(&state.db, &*state.blob_store, model).await?;
    tracing::info!(asset_id = id, "Asset deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/public",
    tag = "Assets",
    operation_id = "listPublicAssets",
    summary = "Browse published assets",
    description = "Returns published assets, newest first, each with a creator summary. \
        Default page size is 12, maximum 100.",
    params(AssetListQuery),
    responses(
        (status = 200, description = "Published assets", body = AssetListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_public_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<AssetListResponse>, AppError> {
    let (page, limit) = page_params(query.page, query.limit, PUBLIC_PAGE_SIZE, MAX_PAGE_SIZE);
    let select = asset::Entity::find().filter(asset::Column::Status.eq(AssetStatus::Published));
    let response = paginate_assets(&state.db, select, page, limit).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/public/{id}",
    tag = "Assets",
    operation_id = "getPublicAsset",
    summary = "View a published asset",
    description = "Returns a published asset and counts one view.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetResponse),
        (status = 404, description = "Asset not found or not published (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_public_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssetResponse>, AppError> {
    let mut model = find_asset(&state.db, id).await?;
    if !model.status.is_public() {
        return Err(AppError::NotFound("Asset not found".into()));
    }

    ingest::increment_counter(&state.db, id, Counter::Views).await?;
    model.views += 1;

    Ok(Json(with_creator(&state.db, model).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/download/{id}",
    tag = "Assets",
    operation_id = "downloadAsset",
    summary = "Download an asset's main file",
    description = "Streams the main file as an attachment under its original name and counts \
        one download. Unpublished assets can only be downloaded by their owner or an admin.",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Asset not published (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Asset or file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn download_asset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let model = find_asset(&state.db, id).await?;
    if !model.status.is_public() {
        auth_user.require_owner_or_admin(model.creator_id)?;
    }

    let main_file = model
        .main_file()
        .map_err(|_| AppError::NotFound("File not found".into()))?;
    let key = BlobKey::parse(&main_file.filename)?;
    let reader = state.blob_store.get_stream(&key).await?;

    ingest::increment_counter(&state.db, id, Counter::Downloads).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &main_file.mimetype)
        .header(header::CONTENT_LENGTH, main_file.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(Disposition::Attachment, &main_file.original_name),
        )
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/image/{filename}",
    tag = "Assets",
    operation_id = "getImage",
    summary = "Serve a cover or profile image",
    description = "Streams a stored cover or profile image with long-lived cache headers. \
        Main files are never served here.",
    params(("filename" = String, Path, description = "Generated blob name")),
    responses(
        (status = 200, description = "Image content", content_type = "image/*"),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(filename))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("Image not found".into());

    let key = BlobKey::parse(&filename).map_err(|_| not_found())?;
    if !key.role().is_public() {
        return Err(not_found());
    }

    let size = state.blob_store.size(&key).await.map_err(|e| match e {
        common::storage::StorageError::NotFound(_) => not_found(),
        other => AppError::from(other),
    })?;
    let reader = state.blob_store.get_stream(&key).await?;

    let content_type = mime_guess::from_path(key.name())
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string());
    let expires = (Utc::now() + chrono::Duration::seconds(IMAGE_MAX_AGE_SECS))
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={IMAGE_MAX_AGE_SECS}, immutable"),
        )
        .header(header::EXPIRES, expires)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET")
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

pub(crate) async fn find_asset<C: ConnectionTrait>(db: &C, id: i32) -> Result<asset::Model, AppError> {
    asset::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found".into()))
}

/// Apply a validated partial update and bump `updated_at`.
pub(crate) async fn apply_asset_update<C: ConnectionTrait>(
    db: &C,
    model: asset::Model,
    payload: UpdateAssetRequest,
) -> Result<asset::Model, AppError> {
    let mut active = model.into_active_model();

    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(tags.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(width) = payload.width {
        active.width = Set(width.trim().to_string());
    }
    if let Some(height) = payload.height {
        active.height = Set(height.trim().to_string());
    }
    if let Some(credit) = payload.credit {
        active.credit = Set(credit);
    }
    if let Some(formats) = payload.formats {
        active.formats = Set(serde_json::to_value(formats)
            .map_err(|e| AppError::Internal(format!("Failed to encode formats: {e}")))?);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Count, fetch one page newest first and attach creator summaries.
pub(crate) async fn paginate_assets<C: ConnectionTrait>(
    db: &C,
    select: Select<asset::Entity>,
    page: u64,
    limit: u64,
) -> Result<AssetListResponse, AppError> {
    let total = select.clone().paginate(db, limit).num_items().await?;

    let models = select
        .order_by_desc(asset::Column::CreatedAt)
        .order_by_desc(asset::Column::Id)
        .offset(Some(page_offset(page, limit)))
        .limit(Some(limit))
        .all(db)
        .await?;

    let creators = load_creators(db, &models).await?;
    let assets = models
        .into_iter()
        .map(|m| {
            let creator = creators.get(&m.creator_id);
            AssetResponse::new(m, creator)
        })
        .collect();

    Ok(AssetListResponse {
        assets,
        pagination: Pagination::new(page, limit, total),
    })
}

async fn with_creator<C: ConnectionTrait>(
    db: &C,
    model: asset::Model,
) -> Result<AssetResponse, AppError> {
    let creator = user::Entity::find_by_id(model.creator_id).one(db).await?;
    Ok(AssetResponse::new(model, creator.as_ref()))
}

async fn load_creators<C: ConnectionTrait>(
    db: &C,
    models: &[asset::Model],
) -> Result<HashMap<i32, user::Model>, AppError> {
    let mut ids: Vec<i32> = models.iter().map(|m| m.creator_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

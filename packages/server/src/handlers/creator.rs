use axum::Json;
use axum::extract::State;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::auth::{ensure_username_free, username_conflict};
use crate::ingest::profile::{discard_in_background, stage_profile_image};
use crate::ingest::staging::Staging;
use crate::models::auth::{UserResponse, normalize_username};
use crate::models::creator::{BeCreatorRequest, parse_data_url, validate_be_creator_request};
use crate::models::shared::normalize_optional;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/creator/be-a-creator",
    tag = "Creator",
    operation_id = "becomeCreator",
    summary = "Become a creator",
    description = "Sets the creator flag on the caller's account together with the public \
        creator profile. `profileImage` may carry a base64 `data:image/...` URL which is \
        processed like a profile upload.",
    request_body = BeCreatorRequest,
    responses(
        (status = 200, description = "Caller is now a creator", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn be_a_creator(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BeCreatorRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_be_creator_request(&payload)?;

    let username = normalize_username(&payload.username);
    ensure_username_free(&state.db, &username, auth_user.user_id).await?;

    let image = match normalize_optional(payload.profile_image.clone()) {
        Some(raw) => Some(parse_data_url(&raw)?),
        None => None,
    };

    let previous_image = auth_user.user.profile_image.clone();
    let mut staging = Staging::new(state.blob_store.clone());

    let result = async {
        let new_image = match image {
            Some(data) => Some(stage_profile_image(&mut staging, data.bytes).await?),
            None => None,
        };
        promote(&state, auth_user.user, payload, username, new_image).await
    }
    .await;

    let updated = match result {
        Ok(updated) => {
            staging.commit();
            updated
        }
        Err(e) => {
            staging.compensate().await;
            return Err(e);
        }
    };

    if let Some(old) = previous_image
        && updated.profile_image.as_deref() != Some(old.as_str())
    {
        discard_in_background(state.blob_store.clone(), old);
    }

    tracing::info!(user_id = updated.id, "Account promoted to creator");
    Ok(Json(updated.into()))
}

async fn promote(
    state: &AppState,
    current: user::Model,
    payload: BeCreatorRequest,
    username: String,
    new_image: Option<String>,
) -> Result<user::Model, AppError> {
    let mut active = current.into_active_model();
    active.name = Set(payload.creator_name.trim().to_string());
    active.username = Set(Some(username));
    active.phone = Set(normalize_optional(payload.phone));
    active.location = Set(normalize_optional(payload.location));
    active.bio = Set(normalize_optional(payload.bio));
    if let Some(image) = new_image {
        active.profile_image = Set(Some(image));
    }
    active.creator = Set(true);
    active.updated_at = Set(Utc::now());

    active.update(&state.db).await.map_err(username_conflict)
}

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use common::UserRole;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::ingest::multipart_error;
use crate::ingest::profile::{discard_in_background, read_image_field, stage_profile_image};
use crate::ingest::staging::Staging;
use crate::models::auth::{
    AuthResponse, CheckUsernameQuery, LoginRequest, ProfileFields, SignupRequest,
    UserResponse, UsernameAvailability, normalize_email, normalize_username,
    validate_login_request, validate_profile_fields, validate_signup_request,
};
use crate::models::shared::normalize_optional;
use crate::state::AppState;
use crate::utils::{hash, jwt};

fn issue_token(state: &AppState, user: &user::Model) -> Result<String, AppError> {
    jwt::sign(
        user.id,
        &user.email,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    operation_id = "signup",
    summary = "Create an account",
    description = "Creates a regular (non-creator) account and returns a bearer token.",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_signup_request(&payload)?;

    let email = normalize_email(&payload.email);
    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .count(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        password: Set(hash),
        role: Set(UserRole::User),
        creator: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Signup race condition: unique constraint caught on insert");
            AppError::Conflict("Email is already registered".into())
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "Account created");
    let token = issue_token(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    description = "Verifies credentials, records the login time and returns a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(&payload.email)))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let mut active = user.into_active_model();
    active.last_login = Set(Some(Utc::now()));
    let user = active.update(&state.db).await?;

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the current account",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<UserResponse> {
    Json(auth_user.user.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/check-username",
    tag = "Auth",
    operation_id = "checkUsername",
    summary = "Check whether a username is free",
    params(CheckUsernameQuery),
    responses(
        (status = 200, description = "Availability", body = UsernameAvailability),
        (status = 400, description = "Empty username (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<CheckUsernameQuery>,
) -> Result<Json<UsernameAvailability>, AppError> {
    let username = normalize_username(&query.username);
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }

    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .count(&state.db)
        .await?;
    Ok(Json(UsernameAvailability { available: taken == 0 }))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    operation_id = "updateProfile",
    summary = "Update the caller's profile",
    description = "Multipart form with optional text fields `name`, `username`, `phone`, \
        `location`, `bio` and an optional `profileImage` file. The image is cropped to a \
        square, resized and re-encoded as JPEG. A replaced image is removed in the background.",
    request_body(content_type = "multipart/form-data", description = "Profile fields"),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let mut staging = Staging::new(state.blob_store.clone());
    let previous_image = auth_user.user.profile_image.clone();

    let updated = match apply_profile_update(&state, auth_user.user, &mut multipart, &mut staging)
        .await
    {
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

    Ok(Json(updated.into()))
}

async fn apply_profile_update(
    state: &AppState,
    current: user::Model,
    multipart: &mut Multipart,
    staging: &mut Staging,
) -> Result<user::Model, AppError> {
    let mut fields = ProfileFields::default();
    let mut new_image: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "profileImage" {
            if new_image.is_some() {
                return Err(AppError::TooManyFiles(
                    "Only one profile image may be uploaded".into(),
                ));
            }
            let bytes =
                read_image_field(field, state.config.storage.max_profile_image_size).await?;
            if bytes.is_empty() {
                continue;
            }
            new_image = Some(stage_profile_image(staging, bytes).await?);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.set_text(&name, value);
        }
    }

    validate_profile_fields(&fields)?;

    let user_id = current.id;
    let mut active = current.into_active_model();

    if let Some(name) = fields.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(username) = fields.username.map(|u| normalize_username(&u))
        && !username.is_empty()
    {
        ensure_username_free(&state.db, &username, user_id).await?;
        active.username = Set(Some(username));
    }
    if fields.phone.is_some() {
        active.phone = Set(normalize_optional(fields.phone));
    }
    if fields.location.is_some() {
        active.location = Set(normalize_optional(fields.location));
    }
    if fields.bio.is_some() {
        active.bio = Set(normalize_optional(fields.bio));
    }
    if let Some(image) = new_image {
        active.profile_image = Set(Some(image));
    }
    active.updated_at = Set(Utc::now());

    active.update(&state.db).await.map_err(username_conflict)
}

#[utoipa::path(
    delete,
    path = "/api/v1/auth/profile-image",
    tag = "Auth",
    operation_id = "deleteProfileImage",
    summary = "Remove the caller's profile image",
    responses(
        (status = 200, description = "Image removed", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_profile_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let Some(old) = auth_user.user.profile_image.clone() else {
        return Ok(Json(auth_user.user.into()));
    };

    let mut active = auth_user.user.into_active_model();
    active.profile_image = Set(None);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    discard_in_background(state.blob_store.clone(), old);
    Ok(Json(updated.into()))
}

/// Reject `username` if an account other than `user_id` holds it.
pub(crate) async fn ensure_username_free<C: ConnectionTrait>(
    db: &C,
    username: &str,
    user_id: i32,
) -> Result<(), AppError> {
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Id.ne(user_id))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::UsernameTaken);
    }
    Ok(())
}

/// Unique violations on update can only come from the username column.
pub(crate) fn username_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(e),
    }
}

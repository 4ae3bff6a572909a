use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header, request::Parts};
use common::UserRole;
use sea_orm::EntityTrait;

use crate::entity::user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// The account is loaded from the database on every request, so role and
/// creator changes take effect immediately and deleted accounts are rejected.
/// Capability checks happen via `require_creator()` / `require_admin()` in the
/// handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub role: UserRole,
    pub creator: bool,
    pub user: user::Model,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_creator(&self) -> Result<(), AppError> {
        if self.creator {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Owners and admins may manage a resource.
    pub fn require_owner_or_admin(&self, owner_id: i32) -> Result<(), AppError> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    async fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims =
            jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

        let user = user::Entity::find_by_id(claims.uid)
            .one(&state.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
            creator: user.creator,
            user,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let value = parts.headers.get(header::AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::TokenInvalid),
    )
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::TokenMissing)??;
        AuthUser::from_token(token, state).await
    }
}

/// `Option<AuthUser>` resolves to `None` for anonymous callers and for
/// unusable tokens instead of rejecting the request.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(Ok(token)) = bearer_token(parts) else {
            return Ok(None);
        };
        match AuthUser::from_token(token, state).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::TokenInvalid) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

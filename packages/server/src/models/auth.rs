use chrono::{DateTime, Utc};
use common::UserRole;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::{AppError, FieldError};

/// Request body for account signup.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    /// Display name (2-50 characters).
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Password (at least 6 characters).
    #[schema(example = "s3cure!")]
    pub password: String,
}

pub fn validate_signup_request(payload: &SignupRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    validate_name(&mut errors, "name", &payload.name);
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
    if payload.password.chars().count() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    into_result(errors)
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "s3cure!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if payload.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email must not be empty"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::new("password", "Password must not be empty"));
    }
    into_result(errors)
}

/// Public view of an account.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub role: UserRole,
    #[schema(example = "ada_designs")]
    pub username: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    /// Blob name servable from `/api/v1/assets/image/{filename}`.
    pub profile_image: Option<String>,
    pub creator: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            username: user.username,
            phone: user.phone,
            location: user.location,
            bio: user.bio,
            profile_image: user.profile_image,
            creator: user.creator,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Response for signup and login.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CheckUsernameQuery {
    pub username: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UsernameAvailability {
    pub available: bool,
}

/// Text fields of a profile update. Absent fields are left unchanged, blank
/// optional fields are cleared.
#[derive(Debug, Default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl ProfileFields {
    /// Record a multipart text field. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            "username" => self.username = Some(value),
            "phone" => self.phone = Some(value),
            "location" => self.location = Some(value),
            "bio" => self.bio = Some(value),
            _ => {}
        }
    }
}

pub fn validate_profile_fields(fields: &ProfileFields) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if let Some(name) = &fields.name {
        validate_name(&mut errors, "name", name);
    }
    if let Some(username) = &fields.username
        && !username.trim().is_empty()
    {
        validate_username(&mut errors, "username", username);
    }
    validate_optional_details(
        &mut errors,
        fields.phone.as_deref(),
        fields.location.as_deref(),
        fields.bio.as_deref(),
    );
    into_result(errors)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn validate_name(errors: &mut Vec<FieldError>, field: &str, name: &str) {
    let len = name.trim().chars().count();
    if !(2..=50).contains(&len) {
        errors.push(FieldError::new(
            field,
            "Name must be between 2 and 50 characters",
        ));
    }
}

pub fn validate_username(errors: &mut Vec<FieldError>, field: &str, username: &str) {
    let username = normalize_username(username);
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        errors.push(FieldError::new(
            field,
            "Username must be between 3 and 30 characters",
        ));
    } else if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        errors.push(FieldError::new(
            field,
            "Username can only contain letters, numbers, and underscores",
        ));
    }
}

/// Phone, location and bio rules. Blank values are allowed (they clear the field).
pub fn validate_optional_details(
    errors: &mut Vec<FieldError>,
    phone: Option<&str>,
    location: Option<&str>,
    bio: Option<&str>,
) {
    if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) {
        let len = phone.chars().count();
        if !(10..=15).contains(&len) {
            errors.push(FieldError::new(
                "phone",
                "Phone number must be between 10 and 15 characters",
            ));
        }
    }
    if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
        let len = location.chars().count();
        if !(2..=100).contains(&len) {
            errors.push(FieldError::new(
                "location",
                "Location must be between 2 and 100 characters",
            ));
        }
    }
    if let Some(bio) = bio
        && bio.trim().chars().count() > 500
    {
        errors.push(FieldError::new("bio", "Bio cannot exceed 500 characters"));
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn into_result(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::FieldErrors(errors))
    }
}

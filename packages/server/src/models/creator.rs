use serde::Deserialize;

use crate::error::{AppError, FieldError};
use crate::models::auth::{into_result, validate_name, validate_optional_details, validate_username};

/// Request body for promoting the caller to a creator.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeCreatorRequest {
    /// Public creator name; replaces the account name.
    #[schema(example = "Ada Designs")]
    pub creator_name: String,
    #[schema(example = "ada_designs")]
    pub username: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    /// Optional picture as a `data:image/...;base64,` URL.
    pub profile_image: Option<String>,
}

pub fn validate_be_creator_request(payload: &BeCreatorRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();
    validate_name(&mut errors, "creatorName", &payload.creator_name);
    if payload.username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    } else {
        validate_username(&mut errors, "username", &payload.username);
    }
    validate_optional_details(
        &mut errors,
        payload.phone.as_deref(),
        payload.location.as_deref(),
        payload.bio.as_deref(),
    );
    into_result(errors)
}

/// Decoded `data:` URL payload.
#[derive(Debug, PartialEq, Eq)]
pub struct DataUrl {
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

/// Parse a base64 `data:` URL such as `data:image/png;base64,iVBOR...`.
pub fn parse_data_url(raw: &str) -> Result<DataUrl, AppError> {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    let invalid = || AppError::Validation("Profile image must be a base64 data URL".into());

    let rest = raw.trim().strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, data) = rest.split_once(',').ok_or_else(invalid)?;
    let mimetype = meta.strip_suffix(";base64").ok_or_else(invalid)?;
    if !mimetype.starts_with("image/") {
        return Err(AppError::Validation(
            "Profile image must be an image".into(),
        ));
    }

    let bytes = STANDARD.decode(data.trim()).map_err(|_| invalid())?;

    Ok(DataUrl {
        mimetype: mimetype.to_ascii_lowercase(),
        bytes,
    })
}

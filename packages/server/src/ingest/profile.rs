//! Profile picture handling shared by the profile and creator endpoints.

use std::sync::Arc;

use axum::extract::multipart::Field;
use common::storage::{BlobKey, BlobRole, BlobStore};

use crate::error::AppError;
use crate::utils::image::{ProfileImageError, process_profile_image};

use super::multipart_error;
use super::staging::Staging;

/// Buffer an image part, rejecting it once it grows past `max_size`.
pub async fn read_image_field(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>, AppError> {
    let mimetype = field.content_type().unwrap_or_default().to_string();
    if !mimetype.is_empty() && !mimetype.starts_with("image/") {
        return Err(AppError::Validation(
            "Only image files are allowed for profile pictures".into(),
        ));
    }

    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (buf.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "Profile image exceeds maximum size of {max_size} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Normalize `bytes` into a square JPEG and stage it in the profile namespace.
///
/// Returns the generated blob name.
pub async fn stage_profile_image(staging: &mut Staging, bytes: Vec<u8>) -> Result<String, AppError> {
    let processed = tokio::task::spawn_blocking(move || process_profile_image(&bytes))
        .await
        .map_err(|e| AppError::Internal(format!("Image task failed: {e}")))?
        .map_err(|e| match e {
            ProfileImageError::Encode(_) => AppError::Internal(e.to_string()),
            other => AppError::Validation(format!("Invalid profile image: {other}")),
        })?;

    let descriptor = staging
        .stage_bytes(
            BlobRole::ProfileImage,
            "profile.jpg".to_string(),
            "image/jpeg".to_string(),
            &processed,
        )
        .await?;
    Ok(descriptor.filename)
}

/// Remove a replaced profile image without waiting for the result.
pub fn discard_in_background(store: Arc<dyn BlobStore>, name: String) {
    let key = match BlobKey::parse(&name) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Not removing unparsable profile image {}: {}", name, e);
            return;
        }
    };
    tokio::spawn(async move {
        if let Err(e) = store.delete(&key).await {
            tracing::warn!(key = %key, "Failed to remove old profile image: {}", e);
        }
    });
}

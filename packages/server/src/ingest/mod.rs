//! Asset ingestion: staged uploads with compensation, deletion of stored
//! files and the atomic view/download counters.

pub mod form;
pub mod mime;
pub mod profile;
pub mod staging;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use common::storage::{BlobKey, BlobRole, BlobStore};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::config::StorageConfig;
use crate::entity::asset;
use crate::error::AppError;
use crate::utils::filename::sanitize_original_name;

use self::form::{MAX_COVER_IMAGES, UploadForm};
use self::staging::Staging;

/// Map a multipart parsing failure. Body-limit hits become `PayloadTooLarge`.
pub fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}

/// Read an asset upload, staging each file part as it arrives.
///
/// File count and type rules are enforced per part; metadata is only
/// collected here and validated by the caller.
pub async fn read_upload(
    multipart: &mut Multipart,
    staging: &mut Staging,
    limits: &StorageConfig,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "mainFile" => {
                if form.main_file.is_some() {
                    return Err(AppError::TooManyFiles(
                        "Only one main file may be uploaded".into(),
                    ));
                }
                let original = sanitize_original_name(field.file_name(), "mainFile");
                let mimetype = mime::resolve(field.content_type(), &original);
                if !mime::is_main_file_type(&mimetype) {
                    return Err(AppError::Validation(format!(
                        "Invalid file type '{mimetype}'. Only images, PDFs, and archives are allowed."
                    )));
                }
                let descriptor = staging
                    .stage_field(
                        field,
                        BlobRole::MainFile,
                        original,
                        mimetype,
                        limits.max_main_file_size,
                    )
                    .await?;
                form.main_file = Some(descriptor);
            }
            "coverImages" => {
                if form.cover_images.len() >= MAX_COVER_IMAGES {
                    return Err(AppError::TooManyFiles(format!(
                        "At most {MAX_COVER_IMAGES} cover images may be uploaded"
                    )));
                }
                let original = sanitize_original_name(field.file_name(), "coverImages");
                let mimetype = mime::resolve(field.content_type(), &original);
                if !mime::is_cover_image_type(&mimetype) {
                    return Err(AppError::Validation(format!(
                        "Invalid cover image type '{mimetype}'. Only images are allowed."
                    )));
                }
                let descriptor = staging
                    .stage_field(
                        field,
                        BlobRole::CoverImage,
                        original,
                        mimetype,
                        limits.max_cover_image_size,
                    )
                    .await?;
                form.cover_images.push(descriptor);
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                form.set_text(&name, value);
            }
        }
    }

    Ok(form)
}

/// Best-effort removal of every file an asset references.
pub async fn remove_asset_files(store: &dyn BlobStore, asset: &asset::Model) {
    for file in asset.files() {
        let key = match BlobKey::parse(&file.filename) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(asset_id = asset.id, "Skipping unparsable file name: {}", e);
                continue;
            }
        };
        if let Err(e) = store.delete(&key).await {
            tracing::warn!(asset_id = asset.id, key = %key, "Failed to delete asset file: {}", e);
        }
    }
}

/// Delete the asset row, then its files.
pub async fn delete_asset<C: ConnectionTrait>(
    db: &C,
    store: &dyn BlobStore,
    asset: asset::Model,
) -> Result<(), AppError> {
    asset::Entity::delete_by_id(asset.id).exec(db).await?;
    remove_asset_files(store, &asset).await;
    Ok(())
}

/// Which usage counter to bump.
#[derive(Clone, Copy, Debug)]
pub enum Counter {
    Views,
    Downloads,
}

/// Atomically add one to a counter (`UPDATE ... SET x = x + 1`).
pub async fn increment_counter<C: ConnectionTrait>(
    db: &C,
    asset_id: i32,
    counter: Counter,
) -> Result<(), AppError> {
    let column = match counter {
        Counter::Views => asset::Column::Views,
        Counter::Downloads => asset::Column::Downloads,
    };

    asset::Entity::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(asset::Column::Id.eq(asset_id))
        .exec(db)
        .await?;

    Ok(())
}

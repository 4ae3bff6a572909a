use std::sync::Arc;

use axum::extract::multipart::Field;
use common::storage::{BlobKey, BlobRole, BlobStore, BoxReader};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::entity::asset::FileDescriptor;
use crate::error::AppError;
use crate::ingest::multipart_error;

/// Files written to the blob store during a request that has not committed yet.
///
/// Call [`Staging::commit`] once the owning document is persisted, or
/// [`Staging::compensate`] to remove everything staged so far.
pub struct Staging {
    store: Arc<dyn BlobStore>,
    staged: Vec<BlobKey>,
}

impl Staging {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    pub fn staged(&self) -> &[BlobKey] {
        &self.staged
    }

    /// Stream a multipart field into the store under a freshly generated key.
    pub async fn stage_field(
        &mut self,
        field: Field<'_>,
        role: BlobRole,
        original_name: String,
        mimetype: String,
        max_size: u64,
    ) -> Result<FileDescriptor, AppError> {
        let key = BlobKey::generate(role, &original_name);
        self.staged.push(key.clone());

        let (size, checksum) = stream_field_to_store(field, &key, &*self.store, max_size).await?;

        Ok(describe(key, original_name, mimetype, size, checksum))
    }

    /// Store an in-memory buffer under a freshly generated key.
    pub async fn stage_bytes(
        &mut self,
        role: BlobRole,
        original_name: String,
        mimetype: String,
        data: &[u8],
    ) -> Result<FileDescriptor, AppError> {
        let key = BlobKey::generate(role, &original_name);
        self.staged.push(key.clone());

        let stored = self.store.put(&key, data).await?;

        Ok(describe(key, original_name, mimetype, stored.size, stored.checksum.to_hex()))
    }

    /// Keep everything staged.
    pub fn commit(self) {
        tracing::debug!(files = self.staged.len(), "Committed staged uploads");
    }

    /// Delete every staged blob. Failures are logged and swallowed.
    pub async fn compensate(self) {
        for key in &self.staged {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!(key = %key, "Failed to remove staged upload: {}", e);
            }
        }
        if !self.staged.is_empty() {
            tracing::info!(files = self.staged.len(), "Rolled back staged uploads");
        }
    }
}

fn describe(
    key: BlobKey,
    original_name: String,
    mimetype: String,
    size: u64,
    checksum: String,
) -> FileDescriptor {
    FileDescriptor {
        filename: key.name().to_string(),
        original_name,
        mimetype,
        size,
        path: key.path(),
        checksum,
    }
}

/// Stream a multipart field to blob storage via a temp file.
///
/// The size limit is enforced while reading so oversized parts never reach
/// the store.
async fn stream_field_to_store(
    mut field: Field<'_>,
    key: &BlobKey,
    blob_store: &dyn BlobStore,
    max_size: u64,
) -> Result<(u64, String), AppError> {
    let temp_path = std::env::temp_dir().join(format!("graphykon-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "'{}' exceeds maximum size of {max_size} bytes",
                    field.name().unwrap_or("file")
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let stored = blob_store.put_stream(key, reader).await?;

        Ok((stored.size, stored.checksum.to_hex()))
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

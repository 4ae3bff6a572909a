use common::{AssetCategory, AssetFormats, AssetStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata of one stored file belonging to an asset.
/// Stored as JSON in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Generated unique blob name.
    #[schema(example = "coverImages-1718000000000-482913.png")]
    pub filename: String,
    #[schema(example = "preview.png")]
    pub original_name: String,
    #[schema(example = "image/png")]
    pub mimetype: String,
    pub size: u64,
    /// Namespaced key relative to the blob store root.
    #[schema(example = "assets/coverImages-1718000000000-482913.png")]
    pub path: String,
    /// SHA-256 of the stored bytes, hex encoded.
    pub checksum: String,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub creator_id: i32,
    #[sea_orm(belongs_to, from = "creator_id", to = "id")]
    pub creator: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub tags: String,
    pub category: AssetCategory,
    pub width: String,
    pub height: String,
    pub credit: bool,

    /// `{jpg, png, psd, pdf}` booleans.
    #[sea_orm(column_type = "JsonBinary")]
    pub formats: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub main_file: serde_json::Value,
    /// JSON array of 1 to 4 file descriptors.
    #[sea_orm(column_type = "JsonBinary")]
    pub cover_images: serde_json::Value,

    pub status: AssetStatus,
    pub views: i64,
    pub downloads: i64,
    pub rating_average: f64,
    pub rating_count: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn formats(&self) -> AssetFormats {
        serde_json::from_value(self.formats.clone()).unwrap_or_default()
    }

    pub fn main_file(&self) -> Result<FileDescriptor, serde_json::Error> {
        serde_json::from_value(self.main_file.clone())
    }

    pub fn cover_images(&self) -> Result<Vec<FileDescriptor>, serde_json::Error> {
        serde_json::from_value(self.cover_images.clone())
    }

    /// Every stored file, main file first. Malformed descriptors are skipped.
    pub fn files(&self) -> Vec<FileDescriptor> {
        let mut files: Vec<FileDescriptor> = self.main_file().into_iter().collect();
        files.extend(self.cover_images().unwrap_or_default());
        files
    }
}

impl ActiveModelBehavior for ActiveModel {}

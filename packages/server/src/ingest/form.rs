use chrono::{DateTime, Utc};
use common::{AssetCategory, AssetFormats, AssetStatus};
use sea_orm::Set;

use crate::entity::asset::{self, FileDescriptor};
use crate::error::FieldError;

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const TAGS_MAX: usize = 200;
pub const MAX_COVER_IMAGES: usize = 4;

/// Everything received from an upload request before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub credit: Option<String>,
    /// `formats.<name>` text fields in arrival order.
    pub formats: Vec<(String, String)>,
    pub main_file: Option<FileDescriptor>,
    pub cover_images: Vec<FileDescriptor>,
}

/// An upload that passed validation and can be persisted.
#[derive(Debug)]
pub struct ValidatedUpload {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub category: AssetCategory,
    pub width: String,
    pub height: String,
    pub credit: bool,
    pub formats: AssetFormats,
    pub main_file: FileDescriptor,
    pub cover_images: Vec<FileDescriptor>,
}

impl UploadForm {
    /// Record a text field. Unknown names are ignored.
    pub fn set_text(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "tags" => self.tags = Some(value),
            "category" => self.category = Some(value),
            "width" => self.width = Some(value),
            "height" => self.height = Some(value),
            "credit" => self.credit = Some(value),
            _ => {
                if let Some(format) = name.strip_prefix("formats.") {
                    self.formats.push((format.to_string(), value));
                }
            }
        }
    }

    /// Validate every field, collecting all problems rather than stopping at
    /// the first one.
    pub fn validate(self) -> Result<ValidatedUpload, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = required_text(&mut errors, "title", self.title, TITLE_MAX, "Title");
        let description = required_text(
            &mut errors,
            "description",
            self.description,
            DESCRIPTION_MAX,
            "Description",
        );
        let tags = required_text(&mut errors, "tags", self.tags, TAGS_MAX, "Tags");

        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<AssetCategory>() {
                Ok(c) => Some(c),
                Err(_) => {
                    errors.push(FieldError::new("category", "Invalid category"));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("category", "Category is required"));
                None
            }
        };

        let width = non_empty(&mut errors, "width", self.width, "Width is required");
        let height = non_empty(&mut errors, "height", self.height, "Height is required");

        let credit = match self.credit.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw).unwrap_or_else(|| {
                errors.push(FieldError::new("credit", "Credit must be true or false"));
                false
            }),
        };

        let mut formats = AssetFormats::default();
        for (name, raw) in &self.formats {
            let field = format!("formats.{name}");
            match parse_flag(raw) {
                Some(value) => {
                    if !formats.set(name, value) {
                        errors.push(FieldError::new(field, "Unknown format"));
                    }
                }
                None => errors.push(FieldError::new(
                    field,
                    format!("{} format must be true or false", name.to_uppercase()),
                )),
            }
        }
        if !formats.any() {
            errors.push(FieldError::new(
                "formats",
                "At least one format must be selected",
            ));
        }

        if self.main_file.is_none() {
            errors.push(FieldError::new("mainFile", "Main file is required"));
        }
        if self.cover_images.is_empty() {
            errors.push(FieldError::new(
                "coverImages",
                "At least one cover image is required",
            ));
        }

        match (title, description, tags, category, width, height, self.main_file) {
            (
                Some(title),
                Some(description),
                Some(tags),
                Some(category),
                Some(width),
                Some(height),
                Some(main_file),
            ) if errors.is_empty() => Ok(ValidatedUpload {
                title,
                description,
                tags,
                category,
                width,
                height,
                credit,
                formats,
                main_file,
                cover_images: self.cover_images,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidatedUpload {
    pub fn into_active_model(self, creator_id: i32, now: DateTime<Utc>) -> asset::ActiveModel {
        asset::ActiveModel {
            creator_id: Set(creator_id),
            title: Set(self.title),
            description: Set(self.description),
            tags: Set(self.tags),
            category: Set(self.category),
            width: Set(self.width),
            height: Set(self.height),
            credit: Set(self.credit),
            formats: Set(serde_json::to_value(self.formats).unwrap_or_default()),
            main_file: Set(serde_json::to_value(&self.main_file).unwrap_or_default()),
            cover_images: Set(serde_json::to_value(&self.cover_images).unwrap_or_default()),
            status: Set(AssetStatus::default()),
            views: Set(0),
            downloads: Set(0),
            rating_average: Set(0.0),
            rating_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// Trimmed length check shared by upload and update validation.
pub fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    max: usize,
    label: &str,
) -> bool {
    let len = value.trim().chars().count();
    if len == 0 || len > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be between 1 and {max} characters"),
        ));
        false
    } else {
        true
    }
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<String>,
    max: usize,
    label: &str,
) -> Option<String> {
    let value = value.unwrap_or_default();
    check_length(errors, field, &value, max, label).then(|| value.trim().to_string())
}

fn non_empty(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<String>,
    message: &str,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

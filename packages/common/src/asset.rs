#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category an asset is filed under.
///
/// Serialized with the human-readable labels shown in the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum AssetCategory {
    #[serde(rename = "Logo")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Logo"))]
    Logo,
    #[serde(rename = "UI Kit")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "UI Kit"))]
    UiKit,
    #[serde(rename = "Illustration")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Illustration"))]
    Illustration,
    #[serde(rename = "Icon Set")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Icon Set"))]
    IconSet,
    #[serde(rename = "Template")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Template"))]
    Template,
    #[serde(rename = "Mockup")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Mockup"))]
    Mockup,
    #[serde(rename = "Other")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Other"))]
    Other,
}

impl AssetCategory {
    pub const ALL: &'static [AssetCategory] = &[
        Self::Logo,
        Self::UiKit,
        Self::Illustration,
        Self::IconSet,
        Self::Template,
        Self::Mockup,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo => "Logo",
            Self::UiKit => "UI Kit",
            Self::Illustration => "Illustration",
            Self::IconSet => "Icon Set",
            Self::Template => "Template",
            Self::Mockup => "Mockup",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("category", s, Self::ALL.iter().map(|c| c.as_str())))
    }
}

/// Publication state of an asset. Only `Published` assets are publicly visible.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "published"))]
    Published,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "archived"))]
    Archived,
}

impl AssetStatus {
    pub const ALL: &'static [AssetStatus] = &[Self::Draft, Self::Published, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("status", s, Self::ALL.iter().map(|v| v.as_str())))
    }
}

/// File formats bundled with an asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssetFormats {
    #[serde(default)]
    pub jpg: bool,
    #[serde(default)]
    pub png: bool,
    #[serde(default)]
    pub psd: bool,
    #[serde(default)]
    pub pdf: bool,
}

impl AssetFormats {
    /// A valid asset offers at least one format.
    pub fn any(&self) -> bool {
        self.jpg || self.png || self.psd || self.pdf
    }

    /// Set a format from its multipart field suffix (`jpg`, `png`, `psd`, `pdf`).
    ///
    /// Returns `false` for an unknown format name.
    pub fn set(&mut self, format: &str, value: bool) -> bool {
        match format {
            "jpg" => self.jpg = value,
            "png" => self.png = value,
            "psd" => self.psd = value,
            "pdf" => self.pdf = value,
            _ => return false,
        }
        true
    }
}

/// Error when parsing an invalid enum token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    field: &'static str,
    invalid: String,
    valid: String,
}

impl ParseEnumError {
    pub(crate) fn new<'a>(
        field: &'static str,
        invalid: &str,
        valid: impl Iterator<Item = &'a str>,
    ) -> Self {
        Self {
            field,
            invalid: invalid.to_string(),
            valid: valid.collect::<Vec<_>>().join(", "),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Valid values: {}",
            self.field, self.invalid, self.valid
        )
    }
}

impl std::error::Error for ParseEnumError {}

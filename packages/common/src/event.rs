#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::asset::ParseEnumError;

/// Kind of interaction recorded in the analytics event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "view"))]
    View,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "download"))]
    Download,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "like"))]
    Like,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "share"))]
    Share,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "follow"))]
    Follow,
}

impl EventType {
    pub const ALL: &'static [EventType] = &[
        Self::View,
        Self::Download,
        Self::Like,
        Self::Share,
        Self::Follow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Download => "download",
            Self::Like => "like",
            Self::Share => "share",
            Self::Follow => "follow",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("type", s, Self::ALL.iter().map(|t| t.as_str())))
    }
}

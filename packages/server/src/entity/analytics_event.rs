use common::EventType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only interaction log.
///
/// `asset_id`, `creator_id` and `user_id` are plain columns without foreign
/// keys so history survives deletion of the asset or the accounts involved.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub asset_id: i32,
    /// Copy of the asset's creator at write time.
    pub creator_id: i32,
    pub user_id: Option<i32>,
    pub event_type: EventType,

    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub session_id: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: serde_json::Value,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

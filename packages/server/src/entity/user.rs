use common::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Stored lowercased.
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: UserRole,

    /// Unique when present; several accounts may have none.
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    /// Generated blob name in the profile namespace.
    pub profile_image: Option<String>,
    pub creator: bool,

    #[sea_orm(has_many)]
    pub assets: HasMany<super::asset::Entity>,

    pub last_login: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Name shown next to activity entries.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.username.as_deref().unwrap_or("Anonymous")
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

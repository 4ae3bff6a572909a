use chrono::Utc;
use common::UserRole;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AdminConfig;
use crate::entity::{analytics_event, asset, user};
use crate::models::auth::normalize_email;
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statements = [
        // Owner listings, newest first.
        Index::create()
            .if_not_exists()
            .name("idx_asset_creator_created")
            .table(asset::Entity)
            .col(asset::Column::CreatorId)
            .col(asset::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Public browse: status filter sorted by creation time.
        Index::create()
            .if_not_exists()
            .name("idx_asset_status_created")
            .table(asset::Entity)
            .col(asset::Column::Status)
            .col(asset::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Admin filters.
        Index::create()
            .if_not_exists()
            .name("idx_asset_category_status")
            .table(asset::Entity)
            .col(asset::Column::Category)
            .col(asset::Column::Status)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_event_created")
            .table(analytics_event::Entity)
            .col(analytics_event::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        Index::create()
            .if_not_exists()
            .name("idx_event_asset_type_created")
            .table(analytics_event::Entity)
            .col(analytics_event::Column::AssetId)
            .col(analytics_event::Column::EventType)
            .col(analytics_event::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
        // Every rollup scans one creator's events in a time window.
        Index::create()
            .if_not_exists()
            .name("idx_event_creator_type_created")
            .table(analytics_event::Entity)
            .col(analytics_event::Column::CreatorId)
            .col(analytics_event::Column::EventType)
            .col(analytics_event::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
    ];

    for stmt in statements {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to create index ({}): {}", stmt, e);
            }
        }
    }
    info!("Ensured database indexes exist");

    Ok(())
}

/// Create the bootstrap administrator when no account uses its email yet.
pub async fn seed_admin(db: &DatabaseConnection, admin: &AdminConfig) -> Result<(), DbErr> {
    let email = normalize_email(&admin.email);
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let password = hash::hash_password(&admin.password)
        .map_err(|e| DbErr::Custom(format!("Failed to hash admin password: {e}")))?;

    let now = Utc::now();
    let model = user::ActiveModel {
        name: Set(admin.name.clone()),
        email: Set(email),
        password: Set(password),
        role: Set(UserRole::Admin),
        creator: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!("Seeded administrator account {}", admin.email),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    Ok(())
}

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::config::{MIB, StorageConfig};
use crate::handlers;
use crate::ingest::form::MAX_COVER_IMAGES;
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file limits.
const FORM_OVERHEAD: u64 = MIB;

pub fn routes(storage: &StorageConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(storage))
        .nest("/creator", creator_routes(storage))
        .nest("/assets", asset_routes(storage))
        .nest("/analytics", analytics_routes())
        .nest("/admin", admin_routes())
}

fn body_limit(bytes: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(usize::try_from(bytes).unwrap_or(usize::MAX))
}

fn auth_routes(storage: &StorageConfig) -> Router<AppState> {
    let profile = Router::new()
        .route("/profile", put(handlers::auth::update_profile))
        .layer(body_limit(storage.max_profile_image_size + FORM_OVERHEAD));

    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
        .route("/check-username", get(handlers::auth::check_username))
        .route(
            "/profile-image",
            delete(handlers::auth::delete_profile_image),
        )
        .merge(profile)
}

fn creator_routes(storage: &StorageConfig) -> Router<AppState> {
    // The profile image arrives base64 encoded inside the JSON body.
    let encoded_image = storage.max_profile_image_size.div_ceil(3) * 4;
    Router::new()
        .route("/be-a-creator", post(handlers::creator::be_a_creator))
        .layer(body_limit(encoded_image + FORM_OVERHEAD))
}

fn asset_routes(storage: &StorageConfig) -> Router<AppState> {
    let upload_limit = storage.max_main_file_size
        + MAX_COVER_IMAGES as u64 * storage.max_cover_image_size
        + FORM_OVERHEAD;
    let upload = Router::new()
        .route("/upload", post(handlers::assets::upload_asset))
        .layer(body_limit(upload_limit));

    Router::new()
        .route("/", get(handlers::assets::list_my_assets))
        .route("/public", get(handlers::assets::list_public_assets))
        .route("/public/{id}", get(handlers::assets::get_public_asset))
        .route("/download/{id}", get(handlers::assets::download_asset))
        .route("/image/{filename}", get(handlers::assets::get_image))
        .route(
            "/{id}",
            get(handlers::assets::get_asset)
                .put(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        .merge(upload)
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/track", post(handlers::analytics::track))
        .route("/overview", get(handlers::analytics::overview))
        .route("/monthly", get(handlers::analytics::monthly))
        .route("/top-assets", get(handlers::analytics::top_assets))
        .route(
            "/category-breakdown",
            get(handlers::analytics::category_breakdown),
        )
        .route(
            "/recent-activity",
            get(handlers::analytics::recent_activity),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/role", put(handlers::admin::update_user_role))
        .route(
            "/users/{id}",
            delete(handlers::admin::delete_user),
        )
        .route("/assets", get(handlers::admin::list_assets))
        .route(
            "/assets/{id}",
            put(handlers::admin::update_asset).delete(handlers::admin::delete_asset),
        )
}

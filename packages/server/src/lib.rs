pub mod analytics;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Graphykon API",
        version = "1.0.0",
        description = "API for the Graphykon creator asset marketplace"
    ),
    paths(
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::check_username,
        handlers::auth::update_profile,
        handlers::auth::delete_profile_image,
        handlers::creator::be_a_creator,
        handlers::assets::upload_asset,
        handlers::assets::list_my_assets,
        handlers::assets::get_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        handlers::assets::list_public_assets,
        handlers::assets::get_public_asset,
        handlers::assets::download_asset,
        handlers::assets::get_image,
        handlers::analytics::track,
        handlers::analytics::overview,
        handlers::analytics::monthly,
        handlers::analytics::top_assets,
        handlers::analytics::category_breakdown,
        handlers::analytics::recent_activity,
        handlers::admin::list_users,
        handlers::admin::update_user_role,
        handlers::admin::delete_user,
        handlers::admin::list_assets,
        handlers::admin::update_asset,
        handlers::admin::delete_asset,
    ),
    tags(
        (name = "Auth", description = "Accounts, login and profiles"),
        (name = "Creator", description = "Creator onboarding"),
        (name = "Assets", description = "Asset upload, browsing and downloads"),
        (name = "Analytics", description = "Event tracking and creator statistics"),
        (name = "Admin", description = "Account and asset moderation"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// An empty origin list allows any origin without credentials.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));
    if origins.is_empty() {
        layer.allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_credentials(true)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes(&state.config.storage))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

//! API handlers for the site inventory REST endpoints

pub mod catalog;
pub mod health;
pub mod openapi;
pub mod sessions;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/catalog/categories", get(catalog::list_categories))
        .route("/catalog/equipment-types", get(catalog::list_equipment_types))
        .route("/catalog/product-names", get(catalog::list_product_names))
        .route("/catalog/product-numbers", get(catalog::list_product_numbers))
        .route("/catalog/reload", post(catalog::reload_catalog))
        // Site views
        .route("/sessions", post(sessions::open_session))
        .route("/sessions/:id", get(sessions::get_session))
        .route("/sessions/:id", delete(sessions::close_session))
        .route("/sessions/:id/refresh", post(sessions::refresh_session))
        .route("/sessions/:id/filter", put(sessions::set_filter))
        // Drafts
        .route("/sessions/:id/draft", patch(sessions::update_field))
        .route("/sessions/:id/draft", delete(sessions::cancel_draft))
        .route("/sessions/:id/draft/new", post(sessions::begin_add_new))
        .route("/sessions/:id/draft/edit/:record_id", post(sessions::begin_edit))
        .route("/sessions/:id/draft/save", post(sessions::save_draft))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

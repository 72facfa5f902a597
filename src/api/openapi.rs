//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalog, health, sessions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Site Inventory API",
        version = "1.0.0",
        description = "Field inventory reconciliation and draft validation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::list_categories,
        catalog::list_equipment_types,
        catalog::list_product_names,
        catalog::list_product_numbers,
        catalog::reload_catalog,
        // Sessions
        sessions::open_session,
        sessions::get_session,
        sessions::close_session,
        sessions::refresh_session,
        sessions::set_filter,
        // Drafts
        sessions::begin_add_new,
        sessions::begin_edit,
        sessions::update_field,
        sessions::cancel_draft,
        sessions::save_draft,
    ),
    components(
        schemas(
            health::HealthResponse,
            catalog::OptionsResponse,
            catalog::ReloadResponse,
            sessions::OpenSessionRequest,
            sessions::SessionResponse,
            sessions::UpdateFieldRequest,
            sessions::CategoryFilterRequest,
            sessions::SaveResponse,
            crate::models::InventoryRecord,
            crate::models::RecordFields,
            crate::models::RecordField,
            crate::models::Provenance,
            crate::models::CatalogEntry,
            crate::models::CategoryRequirement,
            crate::reconcile::WorkspaceSnapshot,
            crate::reconcile::workspace::RecordRow,
            crate::reconcile::workspace::DraftView,
            crate::reconcile::workspace::DuplicateSummary,
            crate::reconcile::SaveOutcome,
            crate::reconcile::SaveWarning,
            crate::reconcile::BlockReason,
            crate::reconcile::MissingFields,
            crate::reconcile::ConflictReport,
            crate::reconcile::FieldConflict,
            crate::reconcile::DuplicateField,
            crate::reconcile::DuplicateFlags,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Cascading catalog options"),
        (name = "sessions", description = "Site views"),
        (name = "drafts", description = "Draft editing and saving"),
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! Catalog option endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;

/// Parent selections for a cascading lookup; missing parents yield no options
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub equipment_type: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionsResponse {
    pub values: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub entries: usize,
}

/// List catalog categories
#[utoipa::path(
    get,
    path = "/catalog/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "Distinct categories", body = OptionsResponse)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<OptionsResponse>> {
    let catalog = state.services.sessions.catalog().await;
    Ok(Json(OptionsResponse {
        values: catalog.categories(),
    }))
}

/// List equipment types for a category
#[utoipa::path(
    get,
    path = "/catalog/equipment-types",
    tag = "catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Equipment types", body = OptionsResponse)
    )
)]
pub async fn list_equipment_types(
    State(state): State<crate::AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<OptionsResponse>> {
    let catalog = state.services.sessions.catalog().await;
    let values = match query.category.as_deref() {
        Some(category) => catalog.equipment_types_for(category),
        None => Vec::new(),
    };
    Ok(Json(OptionsResponse { values }))
}

/// List product names for a category and equipment type
#[utoipa::path(
    get,
    path = "/catalog/product-names",
    tag = "catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Product names", body = OptionsResponse)
    )
)]
pub async fn list_product_names(
    State(state): State<crate::AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<OptionsResponse>> {
    let catalog = state.services.sessions.catalog().await;
    let values = match (query.category.as_deref(), query.equipment_type.as_deref()) {
        (Some(category), Some(equipment_type)) => {
            catalog.product_names_for(category, equipment_type)
        }
        _ => Vec::new(),
    };
    Ok(Json(OptionsResponse { values }))
}

/// List product numbers for a full product selection
#[utoipa::path(
    get,
    path = "/catalog/product-numbers",
    tag = "catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Product numbers", body = OptionsResponse)
    )
)]
pub async fn list_product_numbers(
    State(state): State<crate::AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<OptionsResponse>> {
    let catalog = state.services.sessions.catalog().await;
    let values = match (
        query.category.as_deref(),
        query.equipment_type.as_deref(),
        query.product_name.as_deref(),
    ) {
        (Some(category), Some(equipment_type), Some(product_name)) => {
            catalog.product_numbers_for(category, equipment_type, product_name)
        }
        _ => Vec::new(),
    };
    Ok(Json(OptionsResponse { values }))
}

/// Reload the shared catalog from the store
#[utoipa::path(
    post,
    path = "/catalog/reload",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog reloaded", body = ReloadResponse),
        (status = 500, description = "Reload failed; previous catalog kept")
    )
)]
pub async fn reload_catalog(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ReloadResponse>> {
    let entries = state.services.sessions.reload_catalog().await?;
    Ok(Json(ReloadResponse { entries }))
}

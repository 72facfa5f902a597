//! Catalog reference model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One curated (category, equipment type, product name, product number) tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatalogEntry {
    pub category: String,
    pub equipment_type: String,
    pub product_name: String,
    pub product_number: String,
}

impl CatalogEntry {
    pub fn new(
        category: impl Into<String>,
        equipment_type: impl Into<String>,
        product_name: impl Into<String>,
        product_number: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            equipment_type: equipment_type.into(),
            product_name: product_name.into(),
            product_number: product_number.into(),
        }
    }
}

//! Catalog domain methods on Repository

use super::Repository;
use crate::{error::AppResult, models::CatalogEntry};

impl Repository {
    /// Every curated catalog tuple
    pub async fn catalog_list_entries(&self) -> AppResult<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT category, equipment_type, product_name, product_number
            FROM catalog_entries
            ORDER BY category, equipment_type, product_name, product_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

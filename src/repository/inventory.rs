//! Inventory record domain methods on Repository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{InventoryRecord, NewInventoryRecord, RecordPatch, SiteId},
};

const RECORD_COLUMNS: &str = r#"
    id, site_id, category, equipment_type, product_name, product_number,
    serial_number, tag_id, tag_category, photo_category, photo_1, photo_2,
    provenance, modified_at
"#;

impl Repository {
    /// All records of a site, most recently modified first
    pub async fn inventory_list_for_site(&self, site: &SiteId) -> AppResult<Vec<InventoryRecord>> {
        let query = format!(
            "SELECT {} FROM inventory_records WHERE site_id = $1 ORDER BY modified_at DESC, id",
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, InventoryRecord>(&query)
            .bind(site.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Insert a new record
    pub async fn inventory_create(&self, data: &NewInventoryRecord) -> AppResult<InventoryRecord> {
        let query = format!(
            r#"
            INSERT INTO inventory_records (
                id, site_id, category, equipment_type, product_name, product_number,
                serial_number, tag_id, tag_category, photo_category, photo_1, photo_2,
                provenance, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let f = &data.fields;
        let row = sqlx::query_as::<_, InventoryRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(data.site_id.as_str())
            .bind(f.category.trim())
            .bind(f.equipment_type.trim())
            .bind(f.product_name.trim())
            .bind(f.product_number.trim())
            .bind(trimmed(&f.serial_number))
            .bind(trimmed(&f.tag_id))
            .bind(trimmed(&f.tag_category))
            .bind(trimmed(&f.photo_category))
            .bind(trimmed(&f.photo_1))
            .bind(trimmed(&f.photo_2))
            .bind(data.provenance.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Overwrite the editable fields and provenance of a record, returning its new modification time
    pub async fn inventory_update(
        &self,
        id: Uuid,
        patch: &RecordPatch,
    ) -> AppResult<DateTime<Utc>> {
        let f = &patch.fields;
        let modified_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE inventory_records SET
                category = $2, equipment_type = $3, product_name = $4, product_number = $5,
                serial_number = $6, tag_id = $7, tag_category = $8, photo_category = $9,
                photo_1 = $10, photo_2 = $11, provenance = $12, modified_at = NOW()
            WHERE id = $1
            RETURNING modified_at
            "#,
        )
        .bind(id)
        .bind(f.category.trim())
        .bind(f.equipment_type.trim())
        .bind(f.product_name.trim())
        .bind(f.product_number.trim())
        .bind(trimmed(&f.serial_number))
        .bind(trimmed(&f.tag_id))
        .bind(trimmed(&f.tag_category))
        .bind(trimmed(&f.photo_category))
        .bind(trimmed(&f.photo_1))
        .bind(trimmed(&f.photo_2))
        .bind(patch.provenance.as_str())
        .fetch_optional(&self.pool)
        .await?;

        modified_at.ok_or_else(|| AppError::NotFound(format!("Inventory record {} not found", id)))
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

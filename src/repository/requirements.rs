//! Category requirement domain methods on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::{CategoryRequirement, SiteId},
};

impl Repository {
    /// Requirement rules recorded for one site
    pub async fn requirements_list_for_site(
        &self,
        site: &SiteId,
    ) -> AppResult<Vec<CategoryRequirement>> {
        let rows = sqlx::query_as::<_, CategoryRequirement>(
            r#"
            SELECT site_id, category, required, rule_text, parse_note
            FROM category_requirements
            WHERE site_id = $1
            ORDER BY category
            "#,
        )
        .bind(site.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

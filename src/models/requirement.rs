//! Per-site category requirement model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::site::SiteId;

/// Whether new records of a category may be added at a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryRequirement {
    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "W100")]
    pub site_id: SiteId,
    pub category: String,
    /// `false` forbids adding new records of this category at the site
    pub required: bool,
    pub rule_text: Option<String>,
    /// Note left by the planning-sheet parser that produced the rule
    pub parse_note: Option<String>,
}

//! Repository layer for database operations

pub mod catalog;
pub mod inventory;
pub mod requirements;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        CatalogEntry, CategoryRequirement, InventoryRecord, NewInventoryRecord, RecordPatch, SiteId,
    },
};

/// Persistence collaborator consumed by the reconciliation engine.
///
/// `load_records` must return records most recently modified first.
/// `commit_update` returns the modification time the store recorded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn load_catalog_entries(&self) -> AppResult<Vec<CatalogEntry>>;

    async fn load_category_requirements(&self, site: &SiteId)
        -> AppResult<Vec<CategoryRequirement>>;

    async fn load_records(&self, site: &SiteId) -> AppResult<Vec<InventoryRecord>>;

    async fn commit_insert(&self, record: &NewInventoryRecord) -> AppResult<InventoryRecord>;

    async fn commit_update(&self, id: Uuid, patch: &RecordPatch) -> AppResult<DateTime<Utc>>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for Repository {
    async fn load_catalog_entries(&self) -> AppResult<Vec<CatalogEntry>> {
        self.catalog_list_entries().await
    }

    async fn load_category_requirements(
        &self,
        site: &SiteId,
    ) -> AppResult<Vec<CategoryRequirement>> {
        self.requirements_list_for_site(site).await
    }

    async fn load_records(&self, site: &SiteId) -> AppResult<Vec<InventoryRecord>> {
        self.inventory_list_for_site(site).await
    }

    async fn commit_insert(&self, record: &NewInventoryRecord) -> AppResult<InventoryRecord> {
        self.inventory_create(record).await
    }

    async fn commit_update(&self, id: Uuid, patch: &RecordPatch) -> AppResult<DateTime<Utc>> {
        self.inventory_update(id, patch).await
    }
}

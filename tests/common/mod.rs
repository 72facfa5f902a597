//! In-memory store shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use site_inventory_server::{
    error::{AppError, AppResult},
    models::{
        CatalogEntry, CategoryRequirement, InventoryRecord, NewInventoryRecord, Provenance,
        RecordFields, RecordPatch, SiteId,
    },
    repository::InventoryStore,
};

#[derive(Default)]
pub struct FakeStore {
    pub catalog: Mutex<Vec<CatalogEntry>>,
    pub requirements: Mutex<Vec<CategoryRequirement>>,
    pub records: Mutex<Vec<InventoryRecord>>,
    pub fail_catalog: AtomicBool,
    pub fail_requirements: AtomicBool,
    pub fail_records: AtomicBool,
    pub fail_commits: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InventoryRecord>) -> Self {
        let store = Self::new();
        *store.records.lock().unwrap() = records;
        store
    }

    pub fn set_catalog(&self, entries: Vec<CatalogEntry>) {
        *self.catalog.lock().unwrap() = entries;
    }

    pub fn set_requirements(&self, rows: Vec<CategoryRequirement>) {
        *self.requirements.lock().unwrap() = rows;
    }

    pub fn fail(&self, flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    pub fn stored(&self, id: Uuid) -> Option<InventoryRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

fn unavailable(what: &str) -> AppError {
    AppError::Database(sqlx::Error::Protocol(format!("{} unavailable", what)))
}

#[async_trait]
impl InventoryStore for FakeStore {
    async fn load_catalog_entries(&self) -> AppResult<Vec<CatalogEntry>> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(unavailable("catalog"));
        }
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn load_category_requirements(
        &self,
        site: &SiteId,
    ) -> AppResult<Vec<CategoryRequirement>> {
        if self.fail_requirements.load(Ordering::SeqCst) {
            return Err(unavailable("requirements"));
        }
        Ok(self
            .requirements
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.site_id == site)
            .cloned()
            .collect())
    }

    // deliberately unsorted: the workspace must order by modification time
    async fn load_records(&self, site: &SiteId) -> AppResult<Vec<InventoryRecord>> {
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(unavailable("records"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.site_id == site)
            .cloned()
            .collect())
    }

    async fn commit_insert(&self, record: &NewInventoryRecord) -> AppResult<InventoryRecord> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(unavailable("store"));
        }
        let stored = InventoryRecord {
            id: Uuid::new_v4(),
            site_id: record.site_id.clone(),
            fields: record.fields.clone(),
            provenance: record.provenance,
            modified_at: Utc::now(),
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn commit_update(&self, id: Uuid, patch: &RecordPatch) -> AppResult<DateTime<Utc>> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(unavailable("store"));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Inventory record {} not found", id)))?;
        record.fields = patch.fields.clone();
        record.provenance = patch.provenance;
        record.modified_at = Utc::now();
        Ok(record.modified_at)
    }
}

pub fn site(raw: &str) -> SiteId {
    SiteId::parse(raw).unwrap()
}

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// A complete cabinet record modified on the given day of January 2020
pub fn record(n: u128, site_id: &str, serial: Option<&str>, tag: Option<&str>, day: u32) -> InventoryRecord {
    InventoryRecord {
        id: id(n),
        site_id: site(site_id),
        fields: RecordFields {
            category: "Enclosure-Active".into(),
            equipment_type: "Cabinet".into(),
            product_name: "ModelX".into(),
            product_number: "PN-1".into(),
            serial_number: serial.map(String::from),
            tag_id: tag.map(String::from),
            ..Default::default()
        },
        provenance: Provenance::OriginalImport,
        modified_at: Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap(),
    }
}

pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("Enclosure-Active", "Cabinet", "ModelX", "PN-1"),
        CatalogEntry::new("Enclosure-Active", "Cabinet", "ModelX", "PN-2"),
        CatalogEntry::new("MW-Passive", "Antenna", "Dish 0.6", "A06"),
    ]
}

pub fn not_required(site_id: &str, category: &str, rule: &str) -> CategoryRequirement {
    CategoryRequirement {
        site_id: site(site_id),
        category: category.into(),
        required: false,
        rule_text: Some(rule.into()),
        parse_note: None,
    }
}

//! Per-site-view session state.
//!
//! Every index is replaced whole after a completed load, so queries never
//! see a partial rebuild. A failed load leaves the previous state in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{InventoryRecord, Provenance, RecordField, RecordFields, SiteId},
    repository::InventoryStore,
};

use super::{
    catalog::CatalogIndex,
    coordinator::{ReconciliationCoordinator, Review, SaveOutcome},
    draft::{Draft, DraftController, DraftError},
    duplicates::{ConflictReport, DuplicateField, DuplicateFlags, DuplicateIndex},
    requirements::RequirementGate,
};

/// One record as shown in the site view, with its duplicate highlighting
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordRow {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub duplicates: DuplicateFlags,
}

/// The open draft as shown to the operator
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DraftView {
    pub is_new: bool,
    /// `None` until a new record is committed
    pub record_id: Option<Uuid>,
    pub fields: RecordFields,
    pub original: Option<RecordFields>,
    pub provenance_on_commit: Provenance,
    pub can_commit: bool,
    pub missing_fields: Vec<RecordField>,
    pub conflicts: ConflictReport,
    pub duplicate_flags: DuplicateFlags,
}

/// Values seen more than once, for "N duplicates" badges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DuplicateSummary {
    pub serial_numbers: BTreeMap<String, usize>,
    pub tag_ids: BTreeMap<String, usize>,
}

/// Read-only snapshot of a site view
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkspaceSnapshot {
    #[schema(value_type = String, example = "W100")]
    pub site: SiteId,
    pub category_filter: Option<String>,
    pub record_count: usize,
    pub records: Vec<RecordRow>,
    pub draft: Option<DraftView>,
    pub duplicates: DuplicateSummary,
}

pub struct SiteWorkspace {
    site: SiteId,
    category_filter: Option<String>,
    records: IndexMap<Uuid, InventoryRecord>,
    catalog: Arc<CatalogIndex>,
    gate: RequirementGate,
    duplicates: DuplicateIndex,
    drafts: DraftController,
}

impl SiteWorkspace {
    /// Assemble a workspace from already-loaded data
    pub fn new(
        site: SiteId,
        catalog: Arc<CatalogIndex>,
        gate: RequirementGate,
        records: Vec<InventoryRecord>,
    ) -> Self {
        let mut workspace = Self {
            duplicates: DuplicateIndex::empty(site.clone()),
            site,
            category_filter: None,
            records: IndexMap::new(),
            catalog,
            gate,
            drafts: DraftController::new(),
        };
        workspace.replace_records(records);
        workspace
    }

    /// Load requirements and records for `site`.
    ///
    /// A requirement load failure falls back to a permissive gate. A record
    /// load failure fails the open.
    pub async fn load<S>(
        store: &S,
        site: SiteId,
        catalog: Arc<CatalogIndex>,
        category_filter: Option<String>,
    ) -> AppResult<Self>
    where
        S: InventoryStore + ?Sized,
    {
        let gate = load_gate(store, &site).await;
        let records = store.load_records(&site).await?;
        tracing::info!("Opened site {} with {} records", site, records.len());

        let mut workspace = Self::new(site, catalog, gate, records);
        workspace.set_category_filter(category_filter);
        Ok(workspace)
    }

    /// Reload records and requirements.
    ///
    /// On a record load failure the error is returned and the previous
    /// records, index and gate stay in place. The open draft is untouched.
    pub async fn refresh<S>(&mut self, store: &S) -> AppResult<()>
    where
        S: InventoryStore + ?Sized,
    {
        let records = store.load_records(&self.site).await?;
        match store.load_category_requirements(&self.site).await {
            Ok(rows) => self.gate = RequirementGate::build(self.site.clone(), rows),
            Err(e) => tracing::warn!(
                "Keeping previous requirement rules for {}: reload failed: {}",
                self.site,
                e
            ),
        }
        self.replace_records(records);
        tracing::info!("Refreshed site {} ({} records)", self.site, self.records.len());
        Ok(())
    }

    pub fn site(&self) -> &SiteId {
        &self.site
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.category_filter = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
    }

    /// Swap in a newer shared catalog
    pub fn set_catalog(&mut self, catalog: Arc<CatalogIndex>) {
        self.catalog = catalog;
    }

    pub fn records(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.values()
    }

    pub fn record(&self, id: Uuid) -> Option<&InventoryRecord> {
        self.records.get(&id)
    }

    pub fn gate(&self) -> &RequirementGate {
        &self.gate
    }

    pub fn duplicates(&self) -> &DuplicateIndex {
        &self.duplicates
    }

    pub fn current_draft(&self) -> Option<&Draft> {
        self.drafts.current()
    }

    pub fn begin_edit(&mut self, id: Uuid) -> Result<&Draft, DraftError> {
        let record = self.records.get(&id).ok_or(DraftError::UnknownRecord(id))?;
        Ok(self.drafts.begin_edit(record))
    }

    /// Start a new record, pre-filled with the view's category filter
    pub fn begin_add_new(&mut self) -> Result<&Draft, DraftError> {
        self.drafts
            .begin_add_new(self.site.clone(), self.category_filter.as_deref())
    }

    pub fn update_field(
        &mut self,
        field: RecordField,
        value: Option<String>,
    ) -> Result<&Draft, DraftError> {
        self.drafts.update_field(field, value)
    }

    pub fn cancel(&mut self) -> Result<Draft, DraftError> {
        self.drafts.cancel()
    }

    /// Run the full save sequence for the open draft.
    ///
    /// Blocked and warned outcomes are values. A store failure is returned as
    /// an error and leaves the draft open and unmodified.
    pub async fn attempt_save<S>(&mut self, store: &S) -> AppResult<SaveOutcome>
    where
        S: InventoryStore + ?Sized,
    {
        let draft = self.drafts.current().ok_or(DraftError::NoActiveDraft)?;
        let coordinator =
            ReconciliationCoordinator::new(&self.gate, &self.duplicates, &self.catalog);

        let (request, warnings) = match coordinator.review(draft) {
            Review::Blocked(reason) => {
                tracing::info!("Save blocked at site {}: {}", self.site, reason.message());
                return Ok(SaveOutcome::blocked(reason));
            }
            Review::Proceed { request, warnings } => (request, warnings),
        };
        for warning in &warnings {
            tracing::warn!("Saving at site {} with warning: {}", self.site, warning.message());
        }

        let record = coordinator.commit(store, request).await?;
        self.drafts.complete();
        self.merge_committed(record.clone());
        Ok(SaveOutcome::committed(record, warnings))
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let records = self
            .records
            .values()
            .map(|record| RecordRow {
                duplicates: self.duplicates.flags_for(&record.fields),
                record: record.clone(),
            })
            .collect();

        let draft = self.drafts.current().map(|draft| {
            let conflicts = self.duplicates.check_conflict(draft);
            let missing_fields = draft
                .validate_for_commit()
                .err()
                .map(|m| m.missing)
                .unwrap_or_default();
            DraftView {
                is_new: draft.is_new(),
                record_id: draft.record_id(),
                fields: draft.fields().clone(),
                original: draft.original().map(|r| r.fields.clone()),
                provenance_on_commit: draft.provenance_on_commit(),
                can_commit: missing_fields.is_empty(),
                missing_fields,
                duplicate_flags: conflicts.flags(),
                conflicts,
            }
        });

        WorkspaceSnapshot {
            site: self.site.clone(),
            category_filter: self.category_filter.clone(),
            record_count: self.records.len(),
            records,
            draft,
            duplicates: DuplicateSummary {
                serial_numbers: self.duplicates.duplicated_values(DuplicateField::SerialNumber),
                tag_ids: self.duplicates.duplicated_values(DuplicateField::TagId),
            },
        }
    }

    fn replace_records(&mut self, mut records: Vec<InventoryRecord>) {
        // stable sort keeps collaborator order among equal timestamps
        records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        self.records = records.into_iter().map(|r| (r.id, r)).collect();
        self.rebuild_index();
    }

    fn merge_committed(&mut self, record: InventoryRecord) {
        self.records.shift_remove(&record.id);
        self.records.shift_insert(0, record.id, record);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.duplicates = DuplicateIndex::build(self.site.clone(), self.records.values());
    }
}

async fn load_gate<S>(store: &S, site: &SiteId) -> RequirementGate
where
    S: InventoryStore + ?Sized,
{
    match store.load_category_requirements(site).await {
        Ok(rows) => RequirementGate::build(site.clone(), rows),
        Err(e) => {
            tracing::warn!(
                "Requirement rules for {} unavailable, allowing all categories: {}",
                site,
                e
            );
            RequirementGate::permissive(site.clone())
        }
    }
}

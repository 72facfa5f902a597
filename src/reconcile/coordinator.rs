//! Save-intent orchestration.
//!
//! Review is pure: commit-readiness, then the requirement gate for new
//! records, then the advisory duplicate and catalog checks. Only
//! [`ReconciliationCoordinator::commit`] touches the store.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{InventoryRecord, NewInventoryRecord, RecordPatch, SiteId},
    repository::InventoryStore,
};

use super::{
    catalog::CatalogIndex,
    draft::{Draft, MissingFields},
    duplicates::{DuplicateIndex, FieldConflict},
    requirements::RequirementGate,
};

/// Why a save was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    MissingRequiredFields { missing: MissingFields },
    CategoryNotAllowed { category: String, rule: String },
}

impl BlockReason {
    pub fn message(&self) -> String {
        match self {
            BlockReason::MissingRequiredFields { missing } => missing.to_string(),
            BlockReason::CategoryNotAllowed { rule, .. } => rule.clone(),
        }
    }
}

/// Non-blocking diagnostic attached to a save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaveWarning {
    DuplicateValue { conflict: FieldConflict },
    OffCatalog { message: String },
}

impl SaveWarning {
    pub fn message(&self) -> &str {
        match self {
            SaveWarning::DuplicateValue { conflict } => &conflict.message,
            SaveWarning::OffCatalog { message } => message,
        }
    }
}

/// What to send to the store
#[derive(Debug, Clone, PartialEq)]
pub enum CommitRequest {
    Insert(NewInventoryRecord),
    Update {
        id: Uuid,
        site_id: SiteId,
        patch: RecordPatch,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Review {
    Blocked(BlockReason),
    Proceed {
        request: CommitRequest,
        warnings: Vec<SaveWarning>,
    },
}

/// Result of a save attempt as seen by the host
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Blocked {
        reason: BlockReason,
        message: String,
    },
    Warned {
        record: InventoryRecord,
        warnings: Vec<SaveWarning>,
    },
    Committed {
        record: InventoryRecord,
    },
}

impl SaveOutcome {
    pub fn blocked(reason: BlockReason) -> Self {
        let message = reason.message();
        SaveOutcome::Blocked { reason, message }
    }

    pub fn committed(record: InventoryRecord, warnings: Vec<SaveWarning>) -> Self {
        if warnings.is_empty() {
            SaveOutcome::Committed { record }
        } else {
            SaveOutcome::Warned { record, warnings }
        }
    }

    pub fn record(&self) -> Option<&InventoryRecord> {
        match self {
            SaveOutcome::Blocked { .. } => None,
            SaveOutcome::Warned { record, .. } | SaveOutcome::Committed { record } => Some(record),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, SaveOutcome::Blocked { .. })
    }
}

pub struct ReconciliationCoordinator<'a> {
    gate: &'a RequirementGate,
    duplicates: &'a DuplicateIndex,
    catalog: &'a CatalogIndex,
}

impl<'a> ReconciliationCoordinator<'a> {
    pub fn new(
        gate: &'a RequirementGate,
        duplicates: &'a DuplicateIndex,
        catalog: &'a CatalogIndex,
    ) -> Self {
        Self {
            gate,
            duplicates,
            catalog,
        }
    }

    /// Decide whether `draft` may be committed and with which warnings.
    ///
    /// The requirement gate only applies to new records; an edit of a record
    /// already in a forbidden category is never blocked.
    pub fn review(&self, draft: &Draft) -> Review {
        if let Err(missing) = draft.validate_for_commit() {
            return Review::Blocked(BlockReason::MissingRequiredFields { missing });
        }

        let fields = draft.fields();
        if draft.is_new() {
            if let Some(rule) = self.gate.rejection_reason(&fields.category) {
                return Review::Blocked(BlockReason::CategoryNotAllowed {
                    category: fields.category.trim().to_string(),
                    rule,
                });
            }
        }

        let mut warnings: Vec<SaveWarning> = self
            .duplicates
            .check_conflict(draft)
            .conflicts
            .into_iter()
            .map(|conflict| SaveWarning::DuplicateValue { conflict })
            .collect();
        if let Some(message) = self.catalog.check_selection(fields) {
            warnings.push(SaveWarning::OffCatalog { message });
        }

        let request = match draft {
            Draft::New { site, fields } => CommitRequest::Insert(NewInventoryRecord {
                site_id: site.clone(),
                fields: fields.clone(),
                provenance: draft.provenance_on_commit(),
            }),
            Draft::Editing { original, fields } => CommitRequest::Update {
                id: original.id,
                site_id: original.site_id.clone(),
                patch: RecordPatch::new(original.provenance, fields.clone()),
            },
        };

        Review::Proceed { request, warnings }
    }

    /// Send an approved request to the store and return the record as committed.
    ///
    /// Store failures come back as [`AppError::Commit`] carrying the store's message.
    pub async fn commit<S>(&self, store: &S, request: CommitRequest) -> AppResult<InventoryRecord>
    where
        S: InventoryStore + ?Sized,
    {
        match request {
            CommitRequest::Insert(new_record) => {
                let record = store
                    .commit_insert(&new_record)
                    .await
                    .map_err(AppError::commit)?;
                tracing::info!("Inserted record {} at site {}", record.id, record.site_id);
                Ok(record)
            }
            CommitRequest::Update { id, site_id, patch } => {
                let modified_at = store
                    .commit_update(id, &patch)
                    .await
                    .map_err(AppError::commit)?;
                tracing::info!(
                    "Updated record {} at site {} ({})",
                    id,
                    site_id,
                    patch.provenance
                );
                Ok(InventoryRecord {
                    id,
                    site_id,
                    fields: patch.fields,
                    provenance: patch.provenance,
                    modified_at,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, CategoryRequirement, Provenance, RecordField, RecordFields};
    use crate::repository::MockInventoryStore;
    use chrono::{TimeZone, Utc};

    fn site() -> SiteId {
        SiteId::parse("W200").unwrap()
    }

    fn existing(n: u128, category: &str, serial: Option<&str>, day: u32) -> InventoryRecord {
        InventoryRecord {
            id: Uuid::from_u128(n),
            site_id: site(),
            fields: RecordFields {
                category: category.into(),
                equipment_type: "Antenna".into(),
                product_name: "Dish 0.6".into(),
                product_number: "A06".into(),
                serial_number: serial.map(String::from),
                ..Default::default()
            },
            provenance: Provenance::OriginalImport,
            modified_at: Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap(),
        }
    }

    fn gate() -> RequirementGate {
        RequirementGate::build(
            site(),
            vec![CategoryRequirement {
                site_id: site(),
                category: "MW Passive".into(),
                required: false,
                rule_text: Some("No MW on this site".into()),
                parse_note: Some("row 14".into()),
            }],
        )
    }

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(&[CatalogEntry::new("MW Passive", "Antenna", "Dish 0.6", "A06")])
    }

    fn complete(draft: &mut Draft, category: &str) {
        draft.update_field(RecordField::Category, Some(category.into()));
        draft.update_field(RecordField::EquipmentType, Some("Antenna".into()));
        draft.update_field(RecordField::ProductName, Some("Dish 0.6".into()));
        draft.update_field(RecordField::ProductNumber, Some("A06".into()));
    }

    #[test]
    fn test_incomplete_draft_blocked_first() {
        let (gate, catalog) = (gate(), catalog());
        let duplicates = DuplicateIndex::empty(site());
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let draft = Draft::new_record(site(), Some("MW Passive"));
        match coordinator.review(&draft) {
            Review::Blocked(BlockReason::MissingRequiredFields { missing }) => {
                assert_eq!(missing.missing.len(), 2);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_blocks_new_record_with_rule_text() {
        let (gate, catalog) = (gate(), catalog());
        let duplicates = DuplicateIndex::empty(site());
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::new_record(site(), None);
        complete(&mut draft, "mw_passive");
        match coordinator.review(&draft) {
            Review::Blocked(reason @ BlockReason::CategoryNotAllowed { .. }) => {
                assert!(reason.message().contains("No MW on this site"));
                assert!(reason.message().contains("row 14"));
            }
            other => panic!("expected gate block, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_ignores_edits_of_existing_records() {
        let (gate, catalog) = (gate(), catalog());
        let records = vec![existing(1, "MW Passive", None, 1)];
        let duplicates = DuplicateIndex::build(site(), &records);
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::editing(&records[0]);
        draft.update_field(RecordField::TagId, Some("T-1".into()));
        match coordinator.review(&draft) {
            Review::Proceed { request, warnings } => {
                assert!(warnings.is_empty());
                match request {
                    CommitRequest::Update { id, patch, .. } => {
                        assert_eq!(id, Uuid::from_u128(1));
                        assert_eq!(patch.provenance, Provenance::ManuallyEdited);
                    }
                    other => panic!("expected update, got {:?}", other),
                }
            }
            other => panic!("expected proceed, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_warns_but_proceeds() {
        let gate = RequirementGate::permissive(site());
        let catalog = catalog();
        let records = vec![existing(2, "MW Passive", Some("SN1"), 5)];
        let duplicates = DuplicateIndex::build(site(), &records);
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::new_record(site(), None);
        complete(&mut draft, "MW Passive");
        draft.update_field(RecordField::SerialNumber, Some("sn1".into()));

        match coordinator.review(&draft) {
            Review::Proceed { request, warnings } => {
                assert_eq!(warnings.len(), 1);
                assert!(matches!(warnings[0], SaveWarning::DuplicateValue { .. }));
                match request {
                    CommitRequest::Insert(new_record) => {
                        assert_eq!(new_record.provenance, Provenance::ManuallyAdded);
                        assert_eq!(new_record.site_id, site());
                    }
                    other => panic!("expected insert, got {:?}", other),
                }
            }
            other => panic!("expected proceed, got {:?}", other),
        }
    }

    #[test]
    fn test_off_catalog_selection_warns() {
        let gate = RequirementGate::permissive(site());
        let catalog = catalog();
        let duplicates = DuplicateIndex::empty(site());
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::new_record(site(), None);
        complete(&mut draft, "Power");
        match coordinator.review(&draft) {
            Review::Proceed { warnings, .. } => {
                assert_eq!(warnings.len(), 1);
                assert!(warnings[0].message().contains("Category 'Power'"));
            }
            other => panic!("expected proceed, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_shape() {
        let record = existing(3, "Power", None, 1);
        assert!(matches!(
            SaveOutcome::committed(record.clone(), vec![]),
            SaveOutcome::Committed { .. }
        ));
        let warned = SaveOutcome::committed(
            record,
            vec![SaveWarning::OffCatalog {
                message: "x".into(),
            }],
        );
        let json = serde_json::to_value(&warned).unwrap();
        assert_eq!(json["status"], "warned");
        assert_eq!(json["warnings"][0]["kind"], "off_catalog");
        assert!(warned.record().is_some());
    }

    #[tokio::test]
    async fn test_update_commit_takes_stored_timestamp() {
        let gate = RequirementGate::permissive(site());
        let catalog = CatalogIndex::empty();
        let original = existing(4, "Power", None, 1);
        let duplicates = DuplicateIndex::build(site(), [&original]);
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::editing(&original);
        draft.update_field(RecordField::TagId, Some("T-4".into()));
        let Review::Proceed { request, .. } = coordinator.review(&draft) else {
            panic!("edit should proceed");
        };

        let stored_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut store = MockInventoryStore::new();
        store
            .expect_commit_update()
            .times(1)
            .returning(move |_, _| Ok(stored_at));

        let record = coordinator.commit(&store, request).await.unwrap();
        assert_eq!(record.modified_at, stored_at);
        assert_eq!(record.provenance, Provenance::ManuallyEdited);
    }

    #[tokio::test]
    async fn test_store_failure_becomes_commit_error() {
        let gate = RequirementGate::permissive(site());
        let catalog = CatalogIndex::empty();
        let duplicates = DuplicateIndex::empty(site());
        let coordinator = ReconciliationCoordinator::new(&gate, &duplicates, &catalog);

        let mut draft = Draft::new_record(site(), None);
        complete(&mut draft, "Power");
        let Review::Proceed { request, .. } = coordinator.review(&draft) else {
            panic!("complete draft should proceed");
        };

        let mut store = MockInventoryStore::new();
        store.expect_commit_insert().returning(|_| {
            Err(AppError::Database(sqlx::Error::Protocol(
                "unique constraint on serial_number".into(),
            )))
        });

        match coordinator.commit(&store, request).await {
            Err(AppError::Commit(msg)) => {
                assert!(msg.contains("unique constraint on serial_number"))
            }
            other => panic!("expected a commit error, got {:?}", other),
        }
    }
}

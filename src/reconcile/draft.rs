//! In-flight edit lifecycle.
//!
//! A [`DraftController`] holds at most one [`Draft`]. A draft is either a new
//! record (no identity until committed) or an edit of an existing record,
//! which carries the pre-edit snapshot it was started from.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{InventoryRecord, Provenance, RecordField, RecordFields, SiteId};

use super::normalize::is_blank;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("No draft is being edited")]
    NoActiveDraft,

    #[error("A draft is already open; save or cancel it first")]
    DraftAlreadyActive,

    #[error("Record {0} is not part of this site view")]
    UnknownRecord(Uuid),
}

/// Required fields missing from a draft at commit time
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, ToSchema)]
#[error("Missing required fields: {}", labels(.missing))]
pub struct MissingFields {
    pub missing: Vec<RecordField>,
}

fn labels(fields: &[RecordField]) -> String {
    fields
        .iter()
        .map(RecordField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    New {
        site: SiteId,
        fields: RecordFields,
    },
    Editing {
        original: InventoryRecord,
        fields: RecordFields,
    },
}

impl Draft {
    /// A blank new record, optionally pre-filled with the view's category filter
    pub fn new_record(site: SiteId, default_category: Option<&str>) -> Self {
        let fields = RecordFields {
            category: default_category
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            ..Default::default()
        };
        Draft::New { site, fields }
    }

    /// An exact working copy of `record`
    pub fn editing(record: &InventoryRecord) -> Self {
        Draft::Editing {
            original: record.clone(),
            fields: record.fields.clone(),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Draft::New { .. })
    }

    /// Identity of the record being edited; `None` for a new record
    pub fn record_id(&self) -> Option<Uuid> {
        self.original().map(|r| r.id)
    }

    pub fn site(&self) -> &SiteId {
        match self {
            Draft::New { site, .. } => site,
            Draft::Editing { original, .. } => &original.site_id,
        }
    }

    pub fn fields(&self) -> &RecordFields {
        match self {
            Draft::New { fields, .. } | Draft::Editing { fields, .. } => fields,
        }
    }

    /// Direct field access, bypassing the cascade
    pub(crate) fn fields_mut(&mut self) -> &mut RecordFields {
        match self {
            Draft::New { fields, .. } | Draft::Editing { fields, .. } => fields,
        }
    }

    /// Pre-edit snapshot; `None` for a new record
    pub fn original(&self) -> Option<&InventoryRecord> {
        match self {
            Draft::New { .. } => None,
            Draft::Editing { original, .. } => Some(original),
        }
    }

    /// Provenance the record will carry once this draft is committed
    pub fn provenance_on_commit(&self) -> Provenance {
        match self {
            Draft::New { .. } => Provenance::ManuallyAdded,
            Draft::Editing { original, fields } => {
                Provenance::after_update(original.provenance, fields)
            }
        }
    }

    /// Set `field` and clear every field downstream of it in the catalog chain
    pub fn update_field(&mut self, field: RecordField, value: Option<String>) {
        let fields = self.fields_mut();
        fields.set(field, value);
        for dependent in field.dependents() {
            fields.set(*dependent, None);
        }
    }

    pub fn validate_for_commit(&self) -> Result<(), MissingFields> {
        let fields = self.fields();
        let missing: Vec<RecordField> = RecordField::REQUIRED
            .iter()
            .copied()
            .filter(|f| fields.get(*f).map(is_blank).unwrap_or(true))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingFields { missing })
        }
    }

    pub fn can_commit(&self) -> bool {
        self.validate_for_commit().is_ok()
    }
}

/// Owns the single in-flight draft of one site view
#[derive(Debug, Default)]
pub struct DraftController {
    active: Option<Draft>,
}

impl DraftController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn current(&self) -> Option<&Draft> {
        self.active.as_ref()
    }

    /// Start editing `record`.
    ///
    /// Re-opening the record already being edited keeps the in-flight edits.
    /// Any other open draft, including a new record, is discarded first.
    pub fn begin_edit(&mut self, record: &InventoryRecord) -> &Draft {
        let keep = self
            .active
            .as_ref()
            .map(|d| d.record_id() == Some(record.id))
            .unwrap_or(false);

        if !keep {
            if let Some(previous) = self.active.take() {
                tracing::debug!(
                    "Discarding draft {:?} to edit record {}",
                    previous.record_id(),
                    record.id
                );
            }
            self.active = Some(Draft::editing(record));
        }

        self.active.get_or_insert_with(|| Draft::editing(record))
    }

    /// Start a new record for `site`. Refused while another draft is open.
    pub fn begin_add_new(
        &mut self,
        site: SiteId,
        default_category: Option<&str>,
    ) -> Result<&Draft, DraftError> {
        if self.active.is_some() {
            return Err(DraftError::DraftAlreadyActive);
        }
        let draft = self.active.insert(Draft::new_record(site, default_category));
        Ok(&*draft)
    }

    pub fn update_field(
        &mut self,
        field: RecordField,
        value: Option<String>,
    ) -> Result<&Draft, DraftError> {
        let draft = self.active.as_mut().ok_or(DraftError::NoActiveDraft)?;
        draft.update_field(field, value);
        Ok(&*draft)
    }

    /// Discard the open draft without persisting anything
    pub fn cancel(&mut self) -> Result<Draft, DraftError> {
        self.active.take().ok_or(DraftError::NoActiveDraft)
    }

    pub fn validate_for_commit(&self) -> Result<Result<(), MissingFields>, DraftError> {
        self.active
            .as_ref()
            .map(Draft::validate_for_commit)
            .ok_or(DraftError::NoActiveDraft)
    }

    pub fn can_commit(&self) -> bool {
        self.active.as_ref().map(Draft::can_commit).unwrap_or(false)
    }

    /// Close the draft after a successful commit
    pub(crate) fn complete(&mut self) -> Option<Draft> {
        self.active.take()
    }
}

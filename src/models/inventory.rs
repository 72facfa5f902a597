//! Inventory record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::site::SiteId;

/// How a record reached its current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    OriginalImport,
    ManuallyAdded,
    ManuallyEdited,
    ManuallyVerified,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown provenance tag '{0}'")]
pub struct UnknownProvenance(pub String);

impl Provenance {
    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::OriginalImport => "original_import",
            Provenance::ManuallyAdded => "manually_added",
            Provenance::ManuallyEdited => "manually_edited",
            Provenance::ManuallyVerified => "manually_verified",
        }
    }

    /// Provenance carried by an update of a record whose provenance was `prior`.
    ///
    /// A non-blank photo category always marks the record as verified. Otherwise
    /// a manually added record stays manually added and anything else becomes
    /// manually edited.
    pub fn after_update(prior: Provenance, fields: &RecordFields) -> Provenance {
        if has_text(fields.photo_category.as_deref()) {
            return Provenance::ManuallyVerified;
        }
        match prior {
            Provenance::ManuallyAdded => Provenance::ManuallyAdded,
            _ => Provenance::ManuallyEdited,
        }
    }
}

impl TryFrom<String> for Provenance {
    type Error = UnknownProvenance;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "original_import" => Ok(Provenance::OriginalImport),
            "manually_added" => Ok(Provenance::ManuallyAdded),
            "manually_edited" => Ok(Provenance::ManuallyEdited),
            "manually_verified" => Ok(Provenance::ManuallyVerified),
            _ => Err(UnknownProvenance(value)),
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-editable attributes shared by persisted records and drafts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecordFields {
    pub category: String,
    pub equipment_type: String,
    pub product_name: String,
    pub product_number: String,
    pub serial_number: Option<String>,
    pub tag_id: Option<String>,
    pub tag_category: Option<String>,
    pub photo_category: Option<String>,
    pub photo_1: Option<String>,
    pub photo_2: Option<String>,
}

/// Name of a single editable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Category,
    EquipmentType,
    ProductName,
    ProductNumber,
    SerialNumber,
    TagId,
    TagCategory,
    PhotoCategory,
    Photo1,
    Photo2,
}

impl RecordField {
    /// Fields every commit must carry
    pub const REQUIRED: [RecordField; 3] = [
        RecordField::Category,
        RecordField::EquipmentType,
        RecordField::ProductNumber,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Category => "category",
            RecordField::EquipmentType => "equipment type",
            RecordField::ProductName => "product name",
            RecordField::ProductNumber => "product number",
            RecordField::SerialNumber => "serial number",
            RecordField::TagId => "tag id",
            RecordField::TagCategory => "tag category",
            RecordField::PhotoCategory => "photo category",
            RecordField::Photo1 => "photo 1",
            RecordField::Photo2 => "photo 2",
        }
    }

    /// Fields cleared when this field changes, in cascade order
    pub fn dependents(&self) -> &'static [RecordField] {
        match self {
            RecordField::Category => &[
                RecordField::EquipmentType,
                RecordField::ProductName,
                RecordField::ProductNumber,
            ],
            RecordField::EquipmentType => &[RecordField::ProductName, RecordField::ProductNumber],
            RecordField::ProductName => &[RecordField::ProductNumber],
            _ => &[],
        }
    }
}

impl RecordFields {
    /// Current value of a field; catalog fields are empty strings rather than `None`
    pub fn get(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Category => Some(self.category.as_str()),
            RecordField::EquipmentType => Some(self.equipment_type.as_str()),
            RecordField::ProductName => Some(self.product_name.as_str()),
            RecordField::ProductNumber => Some(self.product_number.as_str()),
            RecordField::SerialNumber => self.serial_number.as_deref(),
            RecordField::TagId => self.tag_id.as_deref(),
            RecordField::TagCategory => self.tag_category.as_deref(),
            RecordField::PhotoCategory => self.photo_category.as_deref(),
            RecordField::Photo1 => self.photo_1.as_deref(),
            RecordField::Photo2 => self.photo_2.as_deref(),
        }
    }

    /// Assign a single field without any cascade.
    ///
    /// Values are trimmed; blank values clear optional fields to `None`.
    pub fn set(&mut self, field: RecordField, value: Option<String>) {
        let optional = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match field {
            RecordField::Category => self.category = optional.unwrap_or_default(),
            RecordField::EquipmentType => self.equipment_type = optional.unwrap_or_default(),
            RecordField::ProductName => self.product_name = optional.unwrap_or_default(),
            RecordField::ProductNumber => self.product_number = optional.unwrap_or_default(),
            RecordField::SerialNumber => self.serial_number = optional,
            RecordField::TagId => self.tag_id = optional,
            RecordField::TagCategory => self.tag_category = optional,
            RecordField::PhotoCategory => self.photo_category = optional,
            RecordField::Photo1 => self.photo_1 = optional,
            RecordField::Photo2 => self.photo_2 = optional,
        }
    }
}

/// Persisted fact about one physical asset at one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryRecord {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "W100")]
    pub site_id: SiteId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: RecordFields,
    #[sqlx(try_from = "String")]
    pub provenance: Provenance,
    pub modified_at: DateTime<Utc>,
}

/// Insert payload for a new record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryRecord {
    pub site_id: SiteId,
    pub fields: RecordFields,
    pub provenance: Provenance,
}

/// Update payload for an existing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub fields: RecordFields,
    pub provenance: Provenance,
}

impl RecordPatch {
    /// Build the patch for saving `fields` over a record last persisted with `prior`
    pub fn new(prior: Provenance, fields: RecordFields) -> Self {
        let provenance = Provenance::after_update(prior, &fields);
        Self { fields, provenance }
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

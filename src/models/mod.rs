//! Data models for site inventory

pub mod catalog;
pub mod inventory;
pub mod requirement;
pub mod site;

// Re-export commonly used types
pub use catalog::CatalogEntry;
pub use inventory::{
    InventoryRecord, NewInventoryRecord, Provenance, RecordField, RecordFields, RecordPatch,
};
pub use requirement::CategoryRequirement;
pub use site::SiteId;

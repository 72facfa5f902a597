//! Inventory reconciliation and draft-validation engine.
//!
//! Everything here is synchronous and pure except loading a workspace and
//! committing a save, which go through [`crate::repository::InventoryStore`].

pub mod catalog;
pub mod coordinator;
pub mod draft;
pub mod duplicates;
pub mod normalize;
pub mod requirements;
pub mod workspace;

pub use catalog::CatalogIndex;
pub use coordinator::{BlockReason, ReconciliationCoordinator, SaveOutcome, SaveWarning};
pub use draft::{Draft, DraftController, DraftError, MissingFields};
pub use duplicates::{ConflictReport, DuplicateField, DuplicateFlags, DuplicateIndex, FieldConflict};
pub use requirements::RequirementGate;
pub use workspace::{SiteWorkspace, WorkspaceSnapshot};

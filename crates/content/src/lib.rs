//! Content without a lifecycle: church events, catalog entries and site settings.
//!
//! These records are plain validated CRUD; only their input invariants live here.

pub mod catalog;
pub mod event;
pub mod settings;

pub use catalog::{CatalogEntry, CatalogEntryId, CatalogInput, CatalogKind};
pub use event::{ChurchEvent, EventId, EventInput, upcoming_public};
pub use settings::{SiteSettings, SiteSettingsPatch};

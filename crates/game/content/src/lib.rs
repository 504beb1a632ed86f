//! Data-driven world content.
//!
//! This crate turns authored RON/TOML files into a ready [`lldm_core::World`]:
//! - Entity catalogs and status templates (RON)
//! - Engine configuration (TOML)
//!
//! Malformed entities never abort a load. They are rejected one by one and
//! reported in the returned [`lldm_core::LoadReport`]; only unreadable files
//! and broken catalog syntax are hard errors.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogFile, CatalogLoader, ConfigLoader, ContentFactory, LoadResult};

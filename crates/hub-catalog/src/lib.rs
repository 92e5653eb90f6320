//! In-memory account and file listing backend.
//!
//! Stands in for the cloud providers' storage APIs: lists folders, creates,
//! renames and deletes entries, applies organization plans, and receives
//! files landed by completed transfers. Nothing is persisted.

mod catalog;
pub mod error;
mod seed;

pub use catalog::CloudCatalog;
pub use error::CatalogError;

//! Catalog error types.

/// Errors produced by [`CloudCatalog`](crate::CloudCatalog) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

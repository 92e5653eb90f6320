//! Shared data types for Cloud Transfer Hub.
//!
//! Every crate in the workspace speaks in these types: the catalog lists
//! [`FileItem`]s per [`CloudAccount`], the transfer engine moves them and
//! reports a [`TransferStatus`], and front-ends render both.

pub mod organize;
pub mod types;

pub use organize::{OrganizationAction, OrganizationPlan};
pub use types::{
    CloudAccount, CloudProvider, FileItem, FileType, LOCAL_ACCOUNT_ID, TransferStatus,
};

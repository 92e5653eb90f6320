use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id of the pseudo-account representing the local machine.
pub const LOCAL_ACCOUNT_ID: &str = "local";

/// Storage provider backing an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudProvider {
    #[serde(rename = "Google Drive")]
    GoogleDrive,
    #[serde(rename = "Dropbox")]
    Dropbox,
    #[serde(rename = "OneDrive")]
    OneDrive,
    #[serde(rename = "Baidu Pan")]
    BaiduPan,
    #[serde(rename = "Aliyun Drive")]
    AliyunDrive,
    #[serde(rename = "115 Pan")]
    Pan115,
    #[serde(rename = "UC Drive")]
    UcDrive,
    #[serde(rename = "Huawei Cloud")]
    HuaweiCloud,
    #[serde(rename = "Quark Drive")]
    QuarkDrive,
    #[serde(rename = "Tencent Weiyun")]
    TencentWeiyun,
    #[serde(rename = "MEGA")]
    Mega,
    #[serde(rename = "Local")]
    Local,
}

impl CloudProvider {
    /// Human-readable provider name, identical to the serialized form.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GoogleDrive => "Google Drive",
            Self::Dropbox => "Dropbox",
            Self::OneDrive => "OneDrive",
            Self::BaiduPan => "Baidu Pan",
            Self::AliyunDrive => "Aliyun Drive",
            Self::Pan115 => "115 Pan",
            Self::UcDrive => "UC Drive",
            Self::HuaweiCloud => "Huawei Cloud",
            Self::QuarkDrive => "Quark Drive",
            Self::TencentWeiyun => "Tencent Weiyun",
            Self::Mega => "MEGA",
            Self::Local => "Local",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A connected storage account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudAccount {
    pub id: String,
    pub provider: CloudProvider,
    pub email: String,
}

impl CloudAccount {
    /// The local machine, used as the source of uploads.
    pub fn local_computer() -> Self {
        Self {
            id: LOCAL_ACCOUNT_ID.into(),
            provider: CloudProvider::Local,
            email: "This Computer".into(),
        }
    }

    /// Returns `true` for the local pseudo-account.
    pub fn is_local(&self) -> bool {
        self.id == LOCAL_ACCOUNT_ID
    }
}

/// Kind of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Folder,
    File,
}

/// A file or folder inside an account.
///
/// `path` is the containing folder with a trailing slash (`"/"`, `"/Photos/"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Size in bytes; zero for folders.
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub path: String,
}

impl FileItem {
    pub fn is_folder(&self) -> bool {
        self.file_type == FileType::Folder
    }

    /// Full path of the entry itself (`"/Photos/beach.jpg"`).
    pub fn full_path(&self) -> String {
        format!("{}{}", self.path, self.name)
    }
}

/// Lifecycle state of a transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Failed")]
    Failed,
    #[serde(rename = "Paused")]
    Paused,
}

impl TransferStatus {
    /// Pending or in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Paused and failed jobs may be resumed (or retried) as a new job.
    pub fn can_resume(self) -> bool {
        matches!(self, Self::Paused | Self::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Paused => "Paused",
        };
        f.write_str(s)
    }
}

//! Demo accounts and files the catalog starts with.

use chrono::{DateTime, NaiveDate, Utc};
use cloudhub_protocol::{CloudAccount, CloudProvider, FileItem, FileType};

pub(crate) fn accounts() -> Vec<CloudAccount> {
    [
        (CloudProvider::GoogleDrive, "user@gmail.com"),
        (CloudProvider::Dropbox, "user@dropbox.com"),
        (CloudProvider::OneDrive, "user@outlook.com"),
        (CloudProvider::BaiduPan, "user@baidu.com"),
        (CloudProvider::AliyunDrive, "user@aliyun.com"),
        (CloudProvider::Pan115, "user@115.com"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (provider, email))| CloudAccount {
        id: format!("acc_{}", i + 1),
        provider,
        email: email.into(),
    })
    .collect()
}

/// Seed files as `(account_id, file)` pairs.
pub(crate) fn files() -> Vec<(&'static str, FileItem)> {
    use FileType::{File, Folder};

    [
        ("acc_1", "f1_1", "Documents", Folder, 0, "2023-10-26", "/"),
        ("acc_1", "f1_2", "Photos", Folder, 0, "2023-10-25", "/"),
        ("acc_1", "f1_3", "project_brief.docx", File, 15_360, "2023-10-24", "/"),
        ("acc_1", "f1_4", "vacation_photo_01.jpg", File, 4_194_304, "2023-08-15", "/Photos/"),
        ("acc_1", "f1_5", "financials_q3.xlsx", File, 122_880, "2023-10-20", "/Documents/"),
        ("acc_1", "f1_6", "Reports", Folder, 0, "2023-09-11", "/Documents/"),
        ("acc_1", "f1_7", "annual_report.pdf", File, 2_400_000, "2023-09-10", "/Documents/Reports/"),
        ("acc_1", "f1_8", "family_video_2023.mp4", File, 34_298_492, "2023-11-15", "/"),
        ("acc_1", "f1_9", "screenshot-1.png", File, 823_491, "2023-11-10", "/"),
        ("acc_2", "f2_1", "Work", Folder, 0, "2023-09-01", "/"),
        ("acc_3", "f3_1", "Personal", Folder, 0, "2023-10-10", "/"),
        ("acc_4", "f4_1", "Backup", Folder, 0, "2023-01-01", "/"),
        ("acc_5", "f5_1", "Movies", Folder, 0, "2023-05-10", "/"),
        ("acc_5", "f5_2", "family_trip.mp4", File, 1_073_741_824, "2023-05-09", "/Movies/"),
        ("acc_6", "f6_1", "Archive", Folder, 0, "2022-01-15", "/"),
    ]
    .into_iter()
    .map(|(account, id, name, file_type, size, date, path)| {
        (
            account,
            FileItem {
                id: id.into(),
                name: name.into(),
                file_type,
                size,
                modified: midnight(date),
                path: path.into(),
            },
        )
    })
    .collect()
}

fn midnight(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

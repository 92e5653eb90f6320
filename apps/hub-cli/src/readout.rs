//! One-line text rendering of queue events.

use cloudhub_hub_transfers::{TransferEvent, TransferJob};
use cloudhub_protocol::TransferStatus;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte count with up to two decimals ("1.5 MB").
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 Bytes".into();
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

fn job_line(job: &TransferJob) -> String {
    let mut line = format!(
        "{:<11} {:<28} {:>5.1}%",
        job.status.to_string(),
        job.file.name,
        job.progress
    );
    match job.status {
        TransferStatus::InProgress => {
            if let Some(speed) = job.speed {
                line.push_str(&format!("  {}/s", format_bytes(speed)));
            }
        }
        TransferStatus::Failed => {
            if let Some(error) = &job.error {
                line.push_str(&format!("  {error}"));
            }
        }
        _ => {}
    }
    line
}

pub fn format_event(event: &TransferEvent) -> String {
    match event {
        TransferEvent::Queued { job } => format!(
            "{:<11} {:<28} {} ({} -> {})",
            "Queued",
            job.file.name,
            format_bytes(job.file.size as f64),
            job.source.provider,
            job.destination.provider
        ),
        TransferEvent::Updated { job } => job_line(job),
        TransferEvent::Removed { id } => format!("{:<11} {id}", "Removed"),
        TransferEvent::Replaced { old_id, job } => {
            format!("{:<11} {} as {}", "Restarted", old_id, job.id)
        }
        TransferEvent::SelectionCleared => "selection cleared".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudhub_hub_transfers::JobId;
    use cloudhub_protocol::{CloudAccount, CloudProvider, FileItem, FileType};

    fn job(status: TransferStatus) -> TransferJob {
        let mut job = TransferJob::new(
            JobId::from("1-1-f"),
            FileItem {
                id: "f".into(),
                name: "report.pdf".into(),
                file_type: FileType::File,
                size: 2 * 1024 * 1024,
                modified: Utc::now(),
                path: "/".into(),
            },
            CloudAccount::local_computer(),
            CloudAccount {
                id: "acc_2".into(),
                provider: CloudProvider::Dropbox,
                email: "user@dropbox.com".into(),
            },
        );
        job.status = status;
        job
    }

    #[test]
    fn bytes_formatting() {
        assert_eq!(format_bytes(0.0), "0 Bytes");
        assert_eq!(format_bytes(512.0), "512 Bytes");
        assert_eq!(format_bytes(1024.0), "1 KB");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(15_360.0), "15 KB");
        assert_eq!(format_bytes(1_073_741_824.0), "1 GB");
        assert_eq!(format_bytes(f64::NAN), "0 Bytes");
    }

    #[test]
    fn queued_line_names_providers() {
        let line = format_event(&TransferEvent::Queued {
            job: job(TransferStatus::Pending),
        });
        assert!(line.starts_with("Queued"));
        assert!(line.contains("report.pdf"));
        assert!(line.contains("2 MB"));
        assert!(line.contains("Dropbox"));
    }

    #[test]
    fn in_progress_line_shows_speed() {
        let mut j = job(TransferStatus::InProgress);
        j.progress = 40.0;
        j.speed = Some(1024.0 * 1024.0);
        let line = format_event(&TransferEvent::Updated { job: j });
        assert!(line.starts_with("In Progress"));
        assert!(line.contains("40.0%"));
        assert!(line.ends_with("1 MB/s"));
    }

    #[test]
    fn failed_line_shows_error() {
        let mut j = job(TransferStatus::Failed);
        j.error = Some("Simulated network error. Please try again.".into());
        let line = format_event(&TransferEvent::Updated { job: j });
        assert!(line.starts_with("Failed"));
        assert!(line.ends_with("Please try again."));
    }
}

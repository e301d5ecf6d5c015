use crate::domain::model::CleanupReport;
use crate::utils::error::{CleanerError, Result};
use std::path::Path;

const CSV_HEADER: [&str; 6] = [
    "cluster_tag",
    "dry_run",
    "action",
    "resource_id",
    "detail",
    "timestamp",
];

pub fn to_csv(report: &CleanupReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for action in &report.actions {
        let timestamp = action.timestamp.to_rfc3339();
        writer.write_record([
            report.cluster_tag.as_str(),
            if report.dry_run { "true" } else { "false" },
            action.kind.as_str(),
            action.resource_id.as_str(),
            action.detail.as_str(),
            timestamp.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CleanerError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| CleanerError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Writes the report as `csv` or `json`, creating parent directories.
pub fn write_report<P: AsRef<Path>>(report: &CleanupReport, path: P, format: &str) -> Result<()> {
    let path = path.as_ref();
    let content = match format {
        "json" => serde_json::to_string_pretty(report)?,
        "csv" => to_csv(report)?,
        other => {
            return Err(CleanerError::InvalidConfigValueError {
                field: "report.format".to_string(),
                value: other.to_string(),
                reason: "Valid values: csv, json".to_string(),
            })
        }
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::debug!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ActionKind;
    use tempfile::TempDir;

    fn sample_report() -> CleanupReport {
        let mut report = CleanupReport::new("abc12", true);
        report.record(ActionKind::DeleteFloatingIp, "fip-1", "203.0.113.10, lb-1");
        report.record(ActionKind::DeleteLoadBalancer, "lb-1", "web");
        report
    }

    #[test]
    fn test_csv_report() {
        let csv = to_csv(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "cluster_tag,dry_run,action,resource_id,detail,timestamp");
        assert!(lines[1].starts_with("abc12,true,delete_floating_ip,fip-1,\"203.0.113.10, lb-1\","));
        assert!(lines[2].starts_with("abc12,true,delete_load_balancer,lb-1,web,"));
    }

    #[test]
    fn test_write_json_report_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/cleanup.json");

        write_report(&sample_report(), &path, "json").unwrap();

        let parsed: CleanupReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.cluster_tag, "abc12");
        assert!(parsed.dry_run);
        assert_eq!(parsed.actions.len(), 2);
        assert_eq!(parsed.actions[0].resource_id, "fip-1");
        assert_eq!(parsed.actions[1].kind, ActionKind::DeleteLoadBalancer);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let dir = TempDir::new().unwrap();
        let result = write_report(&sample_report(), dir.path().join("r.xml"), "xml");
        assert!(matches!(
            result,
            Err(CleanerError::InvalidConfigValueError { .. })
        ));
    }
}

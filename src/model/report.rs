use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PackageCoordinate, Severity};

/// Aggregated vulnerability findings for one package coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerablePackageReport {
    #[serde(flatten)]
    pub coordinate: PackageCoordinate,
    pub vulnerability_count: usize,
    /// Per-severity breakdown, e.g. `"2 high, 1 low"`.
    pub description: String,
    /// Highest-ranked severity label among the advisories.
    pub severity: String,
}

impl VulnerablePackageReport {
    pub fn severity_level(&self) -> Severity {
        Severity::from_label(&self.severity)
    }
}

/// Complete result of auditing one manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub scan_time: DateTime<Utc>,
    pub manifest: String,
    pub packages_checked: usize,
    pub reports: Vec<VulnerablePackageReport>,
    pub warnings: Vec<String>,
}

impl AuditReport {
    pub fn new(manifest: impl Into<String>, packages_checked: usize) -> Self {
        Self {
            scan_time: Utc::now(),
            manifest: manifest.into(),
            packages_checked,
            reports: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Highest severity across all reports, if any package is vulnerable.
    pub fn max_severity(&self) -> Option<Severity> {
        self.reports.iter().map(|r| r.severity_level()).max()
    }

    pub fn count_at(&self, severity: Severity) -> usize {
        self.reports
            .iter()
            .filter(|r| r.severity_level() == severity)
            .count()
    }
}

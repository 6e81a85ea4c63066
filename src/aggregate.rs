//! Collapses the advisories for one package into a single report.

use crate::model::{
    AdvisoryRecord, PackageCoordinate, Severity, VulnerablePackageReport, UNKNOWN_SEVERITY,
};

/// Builds the report for `coordinate`, or `None` when there are no advisories.
///
/// - Empty severities become `"Unknown"`; other labels are kept as reported.
/// - `description` counts advisories per label in first-seen order, e.g. `"2 high, 1 low"`.
///   Labels group case-insensitively under the first spelling seen.
/// - `severity` is the label with the strictly greatest rank; the first one
///   seen wins among equals. Labels outside the rank table rank as Unknown.
pub fn aggregate(
    coordinate: &PackageCoordinate,
    advisories: &[AdvisoryRecord],
) -> Option<VulnerablePackageReport> {
    if advisories.is_empty() {
        return None;
    }

    let mut groups: Vec<(&str, usize)> = Vec::new();
    let mut highest: Option<(&str, Severity)> = None;

    for advisory in advisories {
        let label = normalize_severity(&advisory.severity);

        match groups.iter_mut().find(|(seen, _)| seen.eq_ignore_ascii_case(label)) {
            Some((_, count)) => *count += 1,
            None => groups.push((label, 1)),
        }

        let severity = Severity::from_label(label);
        if highest.is_none_or(|(_, best)| severity.rank() > best.rank()) {
            highest = Some((label, severity));
        }
    }

    let description = groups
        .iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ");

    Some(VulnerablePackageReport {
        coordinate: coordinate.clone(),
        vulnerability_count: advisories.len(),
        description,
        severity: highest
            .map(|(label, _)| label)
            .unwrap_or(UNKNOWN_SEVERITY)
            .to_string(),
    })
}

fn normalize_severity(severity: &str) -> &str {
    if severity.trim().is_empty() {
        UNKNOWN_SEVERITY
    } else {
        severity
    }
}

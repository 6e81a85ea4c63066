//! SARIF (Static Analysis Results Interchange Format) output for CI integration.
//!
//! Each vulnerable package becomes one result located at the manifest file.
//! Advisory-source warnings are attached as tool execution notifications so
//! an incomplete audit is visible in code scanning.

use crate::model::{AuditReport, Severity};
use anyhow::Result;
use serde::Serialize;

const RULE_ID: &str = "vulnerable-library";

/// SARIF v2.1.0 schema root
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    invocations: Vec<SarifInvocation>,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
}

#[derive(Serialize)]
struct SarifInvocation {
    #[serde(rename = "executionSuccessful")]
    execution_successful: bool,
    #[serde(rename = "toolExecutionNotifications")]
    tool_execution_notifications: Vec<SarifNotification>,
}

#[derive(Serialize)]
struct SarifNotification {
    level: &'static str,
    message: SarifMessage,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    properties: SarifProperties,
}

#[derive(Serialize)]
struct SarifProperties {
    provider: String,
    #[serde(rename = "vulnerabilityCount")]
    vulnerability_count: usize,
    severity: String,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Unknown => "note",
    }
}

fn build_report(report: &AuditReport) -> SarifReport {
    let results = report
        .reports
        .iter()
        .map(|package| SarifResult {
            rule_id: RULE_ID,
            level: severity_to_sarif_level(package.severity_level()),
            message: SarifMessage {
                text: format!(
                    "{} has {} known vulnerabilities ({})",
                    package.coordinate, package.vulnerability_count, package.description
                ),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: report.manifest.clone(),
                    },
                },
            }],
            properties: SarifProperties {
                provider: package.coordinate.provider.clone(),
                vulnerability_count: package.vulnerability_count,
                severity: package.severity.clone(),
            },
        })
        .collect();

    let notifications = report
        .warnings
        .iter()
        .map(|warning| SarifNotification {
            level: "warning",
            message: SarifMessage {
                text: warning.clone(),
            },
        })
        .collect();

    SarifReport {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "libscan",
                    version: env!("CARGO_PKG_VERSION"),
                    rules: vec![SarifRule {
                        id: RULE_ID,
                        name: "VulnerableLibrary",
                        short_description: SarifMessage {
                            text: "Client-side library with known vulnerabilities".to_string(),
                        },
                    }],
                },
            },
            invocations: vec![SarifInvocation {
                execution_successful: true,
                tool_execution_notifications: notifications,
            }],
            results,
        }],
    }
}

/// Generate and print SARIF output
pub fn print_sarif(report: &AuditReport) -> Result<()> {
    println!("{}", generate_sarif_string(report)?);
    Ok(())
}

/// Generate SARIF as a string (for file output)
pub fn generate_sarif_string(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&build_report(report))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackageCoordinate, VulnerablePackageReport};

    #[test]
    fn test_sarif_results_and_notifications() {
        let mut report = AuditReport::new("wwwroot/libman.json", 2);
        report.reports.push(VulnerablePackageReport {
            coordinate: PackageCoordinate::new("jquery", "1.12.4", "cdnjs"),
            vulnerability_count: 2,
            description: "1 medium, 1 high".to_string(),
            severity: "high".to_string(),
        });
        report
            .warnings
            .push("Warning: Request to the GitHub Advisory API timed out.".to_string());

        let value: serde_json::Value =
            serde_json::from_str(&generate_sarif_string(&report).unwrap()).unwrap();
        let run = &value["runs"][0];

        assert_eq!(run["results"][0]["ruleId"], RULE_ID);
        assert_eq!(run["results"][0]["level"], "error");
        assert_eq!(
            run["results"][0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "wwwroot/libman.json"
        );
        assert_eq!(run["results"][0]["properties"]["vulnerabilityCount"], 2);
        assert!(run["invocations"][0]["toolExecutionNotifications"][0]["message"]["text"]
            .as_str()
            .unwrap()
            .contains("timed out"));
    }

    #[test]
    fn test_sarif_level_mapping() {
        assert_eq!(severity_to_sarif_level(Severity::Critical), "error");
        assert_eq!(severity_to_sarif_level(Severity::Medium), "warning");
        assert_eq!(severity_to_sarif_level(Severity::Unknown), "note");
    }
}

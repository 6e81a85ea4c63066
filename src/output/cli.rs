use crate::model::{AuditReport, Severity};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Breakdown")]
    breakdown: String,
}

pub fn print_cli_table(report: &AuditReport) -> Result<()> {
    println!();
    println!(
        "Audit of {} completed at: {}",
        report.manifest,
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.reports.is_empty() {
        println!("No vulnerable packages found.");
    } else {
        println!("Found {} vulnerable packages:", report.reports.len());
        println!();

        let mut packages: Vec<_> = report.reports.iter().collect();
        // Most severe first; stable sort keeps manifest order within a level.
        packages.sort_by_key(|p| std::cmp::Reverse(p.severity_level()));

        let rows: Vec<VulnRow> = packages
            .iter()
            .map(|p| VulnRow {
                severity: format_severity(p.severity_level(), &p.severity),
                package: truncate(&p.coordinate.name, 40),
                version: format_version(&p.coordinate.version),
                provider: p.coordinate.provider.clone(),
                count: p.vulnerability_count,
                breakdown: truncate(&p.description, 50),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Some packages could not be checked:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    println!();
    print_summary(report);

    Ok(())
}

fn print_summary(report: &AuditReport) {
    println!("Summary:");
    println!("  Packages checked: {}", report.packages_checked);

    if !report.reports.is_empty() {
        println!(
            "  Vulnerable packages: {} critical, {} high, {} medium, {} low, {} unknown",
            report.count_at(Severity::Critical),
            report.count_at(Severity::High),
            report.count_at(Severity::Medium),
            report.count_at(Severity::Low),
            report.count_at(Severity::Unknown),
        );
    }

    if !report.warnings.is_empty() {
        println!("  Unchecked (advisory source unavailable): {}", report.warnings.len());
    }
}

fn format_severity(severity: Severity, label: &str) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Medium => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Unknown => label.to_uppercase(),
    }
}

fn format_version(version: &str) -> String {
    if version.is_empty() {
        "-".to_string()
    } else {
        version.to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! Audit orchestration: deduplicate packages, query advisories, aggregate.
//!
//! # Example
//!
//! ```no_run
//! use libscan::{
//!     audit::Auditor, checker::GitHubAdvisoryClient, logger::TracingLogger, Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let logger = TracingLogger::shared();
//!     let client = GitHubAdvisoryClient::from_config(&config, logger.clone())?;
//!
//!     let text = std::fs::read_to_string("libman.json")?;
//!     let report = Auditor::new(client, logger)
//!         .audit_manifest("libman.json", &text)
//!         .await?;
//!
//!     for package in &report.reports {
//!         println!("{}: {}", package.coordinate, package.description);
//!     }
//!     Ok(())
//! }
//! ```

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use crate::aggregate::aggregate;
use crate::checker::AdvisorySource;
use crate::config::IgnoreConfig;
use crate::error::ManifestError;
use crate::logger::{AuditLogger, LogLevel};
use crate::manifest::ManifestParser;
use crate::model::{AuditReport, PackageCoordinate, VulnerablePackageReport};

/// Reports and warnings produced by one [`Auditor::audit`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditOutcome {
    /// Number of distinct coordinates sent to the advisory source.
    pub checked: usize,
    pub reports: Vec<VulnerablePackageReport>,
    pub warnings: Vec<String>,
}

pub struct Auditor<S> {
    source: S,
    logger: Arc<dyn AuditLogger>,
    concurrency: usize,
    ignore: IgnoreConfig,
}

impl<S: AdvisorySource> Auditor<S> {
    pub fn new(source: S, logger: Arc<dyn AuditLogger>) -> Self {
        Self {
            source,
            logger,
            concurrency: 1,
            ignore: IgnoreConfig::default(),
        }
    }

    /// Allows up to `concurrency` queries in flight. Results are still
    /// consumed in manifest order, so output is identical to a sequential run.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreConfig) -> Self {
        self.ignore = ignore;
        self
    }

    /// Queries each distinct coordinate once, in first-seen order.
    ///
    /// A failed query contributes a warning and never stops the run.
    pub async fn audit(&self, coordinates: &[PackageCoordinate]) -> AuditOutcome {
        let unique = self.unique_coordinates(coordinates);
        let mut outcome = AuditOutcome {
            checked: unique.len(),
            ..AuditOutcome::default()
        };

        let queries = unique.iter().map(|coordinate| async move {
            self.logger.log_message(
                &format!("Checking {} for known vulnerabilities", coordinate),
                LogLevel::Low,
            );
            let result = self
                .source
                .query(&coordinate.name, &coordinate.version)
                .await;
            (*coordinate, result)
        });

        let mut results = stream::iter(queries).buffered(self.concurrency);

        while let Some((coordinate, result)) = results.next().await {
            if let Some(warning) = result.warning.filter(|w| !w.is_empty()) {
                self.logger.log_warning(&warning);
                outcome.warnings.push(warning);
            }

            if let Some(report) = aggregate(coordinate, &result.advisories) {
                outcome.reports.push(report);
            }
        }

        outcome
    }

    /// Parses a manifest and audits it, logging a summary the way a build
    /// task would.
    ///
    /// A corrupt manifest is logged and returned as an error before any
    /// query is issued.
    pub async fn audit_manifest(
        &self,
        manifest: &str,
        text: &str,
    ) -> Result<AuditReport, ManifestError> {
        self.logger
            .log_message("Starting library audit...", LogLevel::Low);

        let parser = ManifestParser::new(self.logger.clone());
        let packages = match parser.parse_document(text) {
            Ok(packages) => packages,
            Err(e) => {
                self.logger
                    .log_error(&format!("Failed to parse {}: {}", manifest, e));
                return Err(e);
            }
        };

        if packages.is_empty() {
            self.logger
                .log_message(&format!("No packages found in {}", manifest), LogLevel::Normal);
            return Ok(AuditReport::new(manifest, 0));
        }

        let outcome = self.audit(&packages).await;

        if outcome.reports.is_empty() {
            self.logger
                .log_message("No vulnerable packages found", LogLevel::Low);
        } else {
            self.logger.log_warning(&format!(
                "Found {} vulnerable packages in {}",
                outcome.reports.len(),
                manifest
            ));
            for report in &outcome.reports {
                self.logger.log_warning(&format!(
                    "Vulnerable package: {} has {}",
                    report.coordinate, report.description
                ));
            }
        }

        let mut report = AuditReport::new(manifest, outcome.checked);
        report.reports = outcome.reports;
        report.warnings = outcome.warnings;
        Ok(report)
    }

    fn unique_coordinates<'a>(
        &self,
        coordinates: &'a [PackageCoordinate],
    ) -> Vec<&'a PackageCoordinate> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for coordinate in coordinates {
            if !seen.insert(coordinate.key()) {
                continue;
            }
            if self.ignore.should_ignore_package(&coordinate.name) {
                self.logger.log_message(
                    &format!("Skipping ignored package {}", coordinate),
                    LogLevel::Low,
                );
                continue;
            }
            unique.push(coordinate);
        }

        unique
    }
}

//! Core data types for manifest packages, advisories, and audit reports.
//!
//! This module contains the fundamental types used throughout libscan:
//!
//! - [`PackageCoordinate`] - A `(name, version, provider)` triple from the manifest
//! - [`AdvisoryRecord`] - One advisory returned by the advisory source
//! - [`AdvisoryQueryResult`] - Advisories for one package plus an optional warning
//! - [`Severity`] - The fixed severity rank table
//! - [`VulnerablePackageReport`] - Aggregated findings for one package
//! - [`AuditReport`] - Complete audit results
//!
//! # Example
//!
//! ```
//! use libscan::{AuditReport, PackageCoordinate};
//!
//! let package = PackageCoordinate::new("jquery", "3.6.0", "cdnjs");
//! assert_eq!(package.key(), "jquery|3.6.0|cdnjs");
//!
//! let report = AuditReport::new("libman.json", 1);
//! assert!(report.reports.is_empty());
//! ```

mod advisory;
mod package;
mod report;
mod severity;

pub use advisory::*;
pub use package::*;
pub use report::*;
pub use severity::*;

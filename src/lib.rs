pub mod aggregate;
pub mod audit;
pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod model;
pub mod output;

pub use audit::{AuditOutcome, Auditor};
pub use cache::Cache;
pub use config::Config;
pub use model::{
    AdvisoryQueryResult, AdvisoryRecord, AuditReport, PackageCoordinate, Severity,
    VulnerablePackageReport,
};

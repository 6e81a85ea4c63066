//! Library manifest (`libman.json`) parsing.
//!
//! A manifest looks like:
//!
//! ```json
//! {
//!   "defaultProvider": "cdnjs",
//!   "libraries": [
//!     { "library": "jquery@3.6.0", "destination": "wwwroot/lib/jquery" },
//!     { "library": "@popperjs/core@2.11.8", "provider": "unpkg" },
//!     { "library": "vendor/legacy.js", "provider": "filesystem" }
//!   ]
//! }
//! ```
//!
//! Only `library`, `provider` and `defaultProvider` matter here; every other
//! field is ignored. A corrupt document yields no packages at all.

use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::error::ManifestError;
use crate::logger::{AuditLogger, LogLevel};
use crate::model::PackageCoordinate;

const NO_LIBRARIES: &str = "No libraries found in libman.json";

pub struct ManifestParser {
    logger: Arc<dyn AuditLogger>,
}

impl ManifestParser {
    pub fn new(logger: Arc<dyn AuditLogger>) -> Self {
        Self { logger }
    }

    /// Parses manifest text into coordinates, in manifest order.
    ///
    /// A document that is empty, not JSON, or not an object is logged as an
    /// error and yields an empty list.
    pub fn parse(&self, text: &str) -> Vec<PackageCoordinate> {
        match self.parse_document(text) {
            Ok(packages) => packages,
            Err(e) => {
                self.logger
                    .log_error(&format!("Failed to parse libman.json: {}", e));
                Vec::new()
            }
        }
    }

    /// Like [`parse`](Self::parse) but hands document-level failures back to
    /// the caller instead of logging them.
    pub fn parse_document(&self, text: &str) -> Result<Vec<PackageCoordinate>, ManifestError> {
        if text.trim().is_empty() {
            return Err(ManifestError::Empty);
        }

        let root: Value =
            serde_json::from_str(text).map_err(|e| ManifestError::InvalidJson(e.to_string()))?;
        let root = root.as_object().ok_or(ManifestError::NotAnObject)?;

        let default_provider = root
            .get("defaultProvider")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let libraries = match root.get("libraries").and_then(Value::as_array) {
            Some(libraries) => libraries,
            None => {
                self.logger.log_message(NO_LIBRARIES, LogLevel::Normal);
                return Ok(Vec::new());
            }
        };

        let mut packages = Vec::new();

        for entry in libraries {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            let Some(package) = coordinate_from_entry(entry, default_provider) else {
                continue;
            };

            self.logger.log_message(
                &format!(
                    "Found package: {} {} (Provider: {})",
                    package.name, package.version, package.provider
                ),
                LogLevel::Low,
            );
            packages.push(package);
        }

        if packages.is_empty() {
            self.logger.log_message(NO_LIBRARIES, LogLevel::Normal);
        }

        Ok(packages)
    }
}

/// Returns `None` for entries that lack a library name or a resolvable provider.
///
/// An explicit `provider` always wins over `defaultProvider`, even when it is
/// empty or not a string.
fn coordinate_from_entry(
    entry: &Map<String, Value>,
    default_provider: &str,
) -> Option<PackageCoordinate> {
    let library = entry.get("library")?.as_str().unwrap_or_default();

    let provider = match entry.get("provider") {
        Some(value) => value.as_str().unwrap_or_default(),
        None => default_provider,
    };

    if library.is_empty() || provider.is_empty() {
        return None;
    }

    Some(PackageCoordinate::from_library(library, provider))
}

/// Reads a manifest file from disk.
pub fn load_manifest(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })
}

use serde::{Deserialize, Serialize};

/// A single advisory returned by the advisory source.
///
/// `severity` is kept exactly as the source reported it (possibly empty);
/// normalization happens during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    pub severity: String,
    pub description: String,
}

impl AdvisoryRecord {
    pub fn new(severity: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: severity.into(),
            description: description.into(),
        }
    }
}

/// Outcome of one advisory query.
///
/// `warning` is set only when the source could not be reliably queried.
/// A successful query with no advisories carries no warning.
///
/// `confirmed` is true only when the source answered and its answer was
/// read. An inconclusive result (unexpected status, unreadable body) has
/// neither advisories nor a warning, and is not confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvisoryQueryResult {
    pub advisories: Vec<AdvisoryRecord>,
    pub warning: Option<String>,
    pub confirmed: bool,
}

impl AdvisoryQueryResult {
    pub fn found(advisories: Vec<AdvisoryRecord>) -> Self {
        Self {
            advisories,
            warning: None,
            confirmed: true,
        }
    }

    /// No advisories and no warning, but nothing was confirmed either.
    pub fn inconclusive() -> Self {
        Self::default()
    }

    pub fn unavailable(warning: impl Into<String>) -> Self {
        Self {
            advisories: Vec::new(),
            warning: Some(warning.into()),
            confirmed: false,
        }
    }

    pub fn has_warning(&self) -> bool {
        self.warning.as_deref().is_some_and(|w| !w.is_empty())
    }
}

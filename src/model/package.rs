use serde::{Deserialize, Serialize};

/// Provider that serves files from the local file system. Names are never split on `@`.
pub const PROVIDER_FILESYSTEM: &str = "filesystem";
pub const PROVIDER_UNPKG: &str = "unpkg";
pub const PROVIDER_JSDELIVR: &str = "jsdelivr";

/// A package declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageCoordinate {
    pub name: String,
    pub version: String,
    pub provider: String,
}

impl PackageCoordinate {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            provider: provider.into(),
        }
    }

    /// Identity key used for deduplication: `name|version|provider`.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.name, self.version, self.provider)
    }

    /// Builds a coordinate from a raw `library` string using the provider's
    /// name/version split rule.
    ///
    /// - `filesystem`: never split.
    /// - `unpkg` / `jsdelivr` with a scoped name (`@scope/pkg@1.0.0`): split on the second `@`.
    /// - anything else: split on the first `@`.
    ///
    /// Provider matching is case-sensitive.
    pub fn from_library(library: &str, provider: &str) -> Self {
        let (name, version) = split_library(library, provider);
        Self::new(name, version, provider)
    }
}

fn split_library<'a>(library: &'a str, provider: &str) -> (&'a str, &'a str) {
    if provider == PROVIDER_FILESYSTEM {
        return (library, "");
    }

    let scoped = (provider == PROVIDER_UNPKG || provider == PROVIDER_JSDELIVR)
        && library.starts_with('@');

    if scoped {
        // The leading '@' belongs to the scope.
        return match library[1..].find('@') {
            Some(idx) => (&library[..idx + 1], &library[idx + 2..]),
            None => (library, ""),
        };
    }

    library.split_once('@').unwrap_or((library, ""))
}

impl std::fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_first_at() {
        let pkg = PackageCoordinate::from_library("jquery@3.6.0", "cdnjs");
        assert_eq!(pkg.name, "jquery");
        assert_eq!(pkg.version, "3.6.0");
        assert_eq!(pkg.provider, "cdnjs");
    }

    #[test]
    fn test_split_without_version() {
        let pkg = PackageCoordinate::from_library("jquery", "cdnjs");
        assert_eq!(pkg.name, "jquery");
        assert_eq!(pkg.version, "");
    }

    #[test]
    fn test_filesystem_never_splits() {
        let pkg = PackageCoordinate::from_library("local@lib", "filesystem");
        assert_eq!(pkg.name, "local@lib");
        assert_eq!(pkg.version, "");
    }

    #[test]
    fn test_scoped_splits_on_second_at() {
        for provider in ["unpkg", "jsdelivr"] {
            let pkg = PackageCoordinate::from_library("@scope/package@1.0.0", provider);
            assert_eq!(pkg.name, "@scope/package");
            assert_eq!(pkg.version, "1.0.0");
        }
    }

    #[test]
    fn test_scoped_without_version() {
        let pkg = PackageCoordinate::from_library("@scope/package", "unpkg");
        assert_eq!(pkg.name, "@scope/package");
        assert_eq!(pkg.version, "");
    }

    #[test]
    fn test_scoped_on_other_provider_splits_on_first_at() {
        let pkg = PackageCoordinate::from_library("@scope/package@1.0.0", "cdnjs");
        assert_eq!(pkg.name, "");
        assert_eq!(pkg.version, "scope/package@1.0.0");
    }

    #[test]
    fn test_provider_match_is_case_sensitive() {
        let pkg = PackageCoordinate::from_library("local@lib", "FileSystem");
        assert_eq!(pkg.name, "local");
        assert_eq!(pkg.version, "lib");
    }

    #[test]
    fn test_key_and_display() {
        let pkg = PackageCoordinate::new("jquery", "3.6.0", "cdnjs");
        assert_eq!(pkg.key(), "jquery|3.6.0|cdnjs");
        assert_eq!(pkg.to_string(), "jquery@3.6.0");
        assert_eq!(PackageCoordinate::new("app.js", "", "filesystem").to_string(), "app.js");
    }
}

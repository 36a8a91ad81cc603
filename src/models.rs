use serde::{Deserialize, Serialize};

/// One pinned dependency, normalized from whichever lockfile schema it came
/// from.
///
/// Field order is the key order of the JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Set by [`crate::merge::merge`]; `None` means no license file was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, url: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            version,
            license: None,
        }
    }

    /// Hosting account of the dependency, i.e. the first path segment of its
    /// URL (`apple` for `https://github.com/apple/swift-algorithms.git`).
    pub fn organisation(&self) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        let first = url.path_segments()?.find(|s| !s.is_empty())?;
        Some(first.to_string())
    }
}

/// A file inside a checkout believed to hold the dependency's license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCandidate {
    pub file_name: String,
    pub text: String,
}

/// Dependencies in lockfile pin order, each optionally carrying its license.
pub type MergedReport = Vec<Dependency>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organisation_from_url() {
        let dep = Dependency::new(
            "swift-algorithms",
            "https://github.com/apple/swift-algorithms.git",
            None,
        );
        assert_eq!(dep.organisation().as_deref(), Some("apple"));
    }

    #[test]
    fn test_organisation_missing_for_bad_url() {
        let dep = Dependency::new("x", "not a url", None);
        assert_eq!(dep.organisation(), None);
    }
}

//! Error taxonomy for license generation.
//!
//! Fatal variants abort the run: [`LicenseError::MalformedLockfile`],
//! [`LicenseError::CheckoutRootUnreadable`], [`LicenseError::Serialization`],
//! [`LicenseError::Io`], [`LicenseError::Discovery`] and
//! [`LicenseError::Config`].
//!
//! [`LicenseError::UnreadableSubdirectory`] and
//! [`LicenseError::UnparseableDependencyUrl`] only ever affect one checkout or
//! one dependency; callers log them and carry on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    /// The lockfile is not valid JSON, or matches none of the known shapes.
    #[error("malformed lockfile {}: {reason}", .path.display())]
    MalformedLockfile { path: PathBuf, reason: String },

    /// The checkout root could not be listed.
    #[error("cannot read checkout directory {}: {source}", .path.display())]
    CheckoutRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single checkout could not be listed or its license file read.
    #[error("cannot read checkout {}: {source}", .path.display())]
    UnreadableSubdirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No repository name could be derived from a dependency URL.
    #[error("cannot derive repository name from '{url}': {reason}")]
    UnparseableDependencyUrl { url: String, reason: String },

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lockfile or checkout directory could not be located.
    #[error("{0}")]
    Discovery(String),

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl LicenseError {
    /// Attach a path to a lockfile decode failure. `parse` works on raw
    /// bytes and does not know where they came from.
    pub fn at_path(self, at: &std::path::Path) -> Self {
        match self {
            LicenseError::MalformedLockfile { reason, .. } => LicenseError::MalformedLockfile {
                path: at.to_path_buf(),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_path() {
        let err = LicenseError::MalformedLockfile {
            path: PathBuf::new(),
            reason: "expected value".into(),
        }
        .at_path(std::path::Path::new("App/Package.resolved"));
        assert_eq!(
            err.to_string(),
            "malformed lockfile App/Package.resolved: expected value"
        );
    }

    #[test]
    fn test_at_path_leaves_other_variants_alone() {
        let err = LicenseError::Discovery("nope".into()).at_path(std::path::Path::new("x"));
        assert_eq!(err.to_string(), "nope");
    }
}

//! `Package.resolved` decoding.
//!
//! SwiftPM has changed the lockfile layout several times. Every known
//! generation decodes into [`LockfileDocument`], and [`parse`] normalizes its
//! pins into [`Dependency`] records:
//!
//! - v1 wraps the pins in an `object` key: `{"object": {"pins": [...]}, "version": 1}`
//! - v2/v3 keep them at the root: `{"pins": [...], "version": 2}`
//! - a bare array of pins is also accepted
//!
//! Pins name the same values differently per generation (`package` vs
//! `identity`, `repositoryURL` vs `location`); each logical field is resolved
//! through one alias priority list.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LicenseError;
use crate::models::Dependency;

/// Key of the v1 wrapper object.
const WRAPPER_KEY: &str = "object";

#[derive(Debug)]
pub enum LockfileDocument {
    Wrapped {
        version: Option<u32>,
        pins: Vec<RawPin>,
    },
    Flat {
        version: Option<u32>,
        pins: Vec<RawPin>,
    },
    Bare(Vec<RawPin>),
}

#[derive(Debug, Deserialize)]
struct WrappedDocument {
    #[serde(default)]
    version: Option<u32>,
    object: PinList,
}

#[derive(Debug, Deserialize)]
struct FlatDocument {
    #[serde(default)]
    version: Option<u32>,
    pins: Vec<RawPin>,
}

#[derive(Debug, Deserialize)]
struct PinList {
    pins: Vec<RawPin>,
}

/// A pin as written by any lockfile generation. Every field is optional;
/// placeholder entries are filtered during normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPin {
    identity: Option<String>,
    package: Option<String>,
    name: Option<String>,
    location: Option<String>,
    #[serde(rename = "repositoryURL")]
    repository_url: Option<String>,
    url: Option<String>,
    state: Option<RawState>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawState {
    version: Option<String>,
    revision: Option<String>,
    branch: Option<String>,
}

impl LockfileDocument {
    /// Decode a lockfile, trying the wrapped shape first.
    ///
    /// When the wrapper key is present the document is decoded as the
    /// wrapped shape only; a root-level `pins` array next to it is ignored.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LicenseError> {
        let value: Value = serde_json::from_slice(bytes).map_err(malformed)?;

        let wrapped = value
            .as_object()
            .is_some_and(|map| map.contains_key(WRAPPER_KEY));
        if wrapped {
            let doc: WrappedDocument = serde_json::from_value(value).map_err(malformed)?;
            return Ok(LockfileDocument::Wrapped {
                version: doc.version,
                pins: doc.object.pins,
            });
        }

        match value {
            Value::Object(_) => {
                let doc: FlatDocument = serde_json::from_value(value).map_err(malformed)?;
                Ok(LockfileDocument::Flat {
                    version: doc.version,
                    pins: doc.pins,
                })
            }
            Value::Array(_) => {
                let pins: Vec<RawPin> = serde_json::from_value(value).map_err(malformed)?;
                Ok(LockfileDocument::Bare(pins))
            }
            other => Err(malformed(format!(
                "expected an object or array at the document root, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn schema_version(&self) -> Option<u32> {
        match self {
            LockfileDocument::Wrapped { version, .. } | LockfileDocument::Flat { version, .. } => {
                *version
            }
            LockfileDocument::Bare(_) => None,
        }
    }

    pub fn into_pins(self) -> Vec<RawPin> {
        match self {
            LockfileDocument::Wrapped { pins, .. }
            | LockfileDocument::Flat { pins, .. }
            | LockfileDocument::Bare(pins) => pins,
        }
    }
}

impl RawPin {
    /// Normalize into a [`Dependency`]; `None` when identity or location is
    /// missing.
    fn into_dependency(self) -> Option<Dependency> {
        let name = first_present([self.identity, self.package, self.name])?;
        let url = first_present([self.location, self.repository_url, self.url])?;
        let version = self
            .state
            .and_then(|s| first_present([s.version, s.revision, s.branch]));
        Some(Dependency::new(name, url, version))
    }
}

/// First alias holding a non-empty value, in priority order.
fn first_present<const N: usize>(aliases: [Option<String>; N]) -> Option<String> {
    aliases
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// Parse raw lockfile bytes into dependencies, preserving pin order.
pub fn parse(bytes: &[u8]) -> Result<Vec<Dependency>, LicenseError> {
    let document = LockfileDocument::from_slice(bytes)?;
    debug!(schema_version = ?document.schema_version(), "decoded lockfile");

    let deps = document
        .into_pins()
        .into_iter()
        .enumerate()
        .filter_map(|(index, pin)| {
            let dep = pin.into_dependency();
            if dep.is_none() {
                debug!(index, "skipping pin without identity or location");
            }
            dep
        })
        .collect();

    Ok(deps)
}

/// Read and parse the lockfile at `path`.
///
/// A missing lockfile is not fatal: it is logged and yields no dependencies.
pub fn load(path: &Path) -> Result<Vec<Dependency>, LicenseError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "lockfile not found, no dependencies to report");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(LicenseError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse(&bytes).map_err(|e| e.at_path(path))
}

fn malformed(reason: impl ToString) -> LicenseError {
    LicenseError::MalformedLockfile {
        path: PathBuf::new(),
        reason: reason.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

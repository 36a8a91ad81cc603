//! Locate `Package.resolved` and the checkout directory for a project.
//!
//! Supported layouts:
//! - `App.xcodeproj` → lockfile inside the embedded workspace, checkouts in
//!   DerivedData (or under `--custom-build-path`)
//! - `App.xcworkspace` → same, lockfile under `xcshareddata/swiftpm`
//! - a SwiftPM package directory → `Package.resolved` next to `Package.swift`,
//!   checkouts in `.build/checkouts`

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::LicenseError;

const LOCKFILE_NAME: &str = "Package.resolved";

/// Inputs for [`resolve`]. Explicit paths win over anything derived.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub project: PathBuf,
    pub build_dir: Option<PathBuf>,
    pub lockfile: Option<PathBuf>,
    pub checkouts: Option<PathBuf>,
    /// Root of Xcode's DerivedData; `None` when no home directory is known.
    pub derived_data: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub lockfile: PathBuf,
    pub checkouts: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectKind {
    XcodeProject,
    XcodeWorkspace,
    Package,
}

impl ProjectKind {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xcodeproj") => ProjectKind::XcodeProject,
            Some("xcworkspace") => ProjectKind::XcodeWorkspace,
            _ => ProjectKind::Package,
        }
    }
}

/// Default DerivedData location: `~/Library/Developer/Xcode/DerivedData`.
pub fn default_derived_data() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Library")
            .join("Developer")
            .join("Xcode")
            .join("DerivedData")
    })
}

/// Directory holding project-level configuration: the parent of an Xcode
/// project or workspace, or the package directory itself.
pub fn project_dir(project: &Path) -> PathBuf {
    match ProjectKind::of(project) {
        ProjectKind::Package => project.to_path_buf(),
        _ => project
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

pub fn resolve(request: &DiscoveryRequest) -> Result<ResolvedPaths, LicenseError> {
    let kind = ProjectKind::of(&request.project);

    let lockfile = match &request.lockfile {
        Some(path) => path.clone(),
        None => lockfile_path(&request.project, kind),
    };

    let checkouts = match (&request.checkouts, &request.build_dir) {
        (Some(path), _) => path.clone(),
        (None, Some(build_dir)) => existing(
            build_dir.join("SourcePackages").join("checkouts"),
            "custom build path",
        )?,
        (None, None) => match kind {
            ProjectKind::Package => existing(
                request.project.join(".build").join("checkouts"),
                "package build directory",
            )?,
            _ => derived_data_checkouts(&request.project, request.derived_data.as_deref())?,
        },
    };

    debug!(lockfile = %lockfile.display(), checkouts = %checkouts.display(), "resolved paths");
    Ok(ResolvedPaths { lockfile, checkouts })
}

fn lockfile_path(project: &Path, kind: ProjectKind) -> PathBuf {
    match kind {
        ProjectKind::XcodeProject => project
            .join("project.xcworkspace")
            .join("xcshareddata")
            .join("swiftpm")
            .join(LOCKFILE_NAME),
        ProjectKind::XcodeWorkspace => project
            .join("xcshareddata")
            .join("swiftpm")
            .join(LOCKFILE_NAME),
        ProjectKind::Package => project.join(LOCKFILE_NAME),
    }
}

fn existing(path: PathBuf, what: &str) -> Result<PathBuf, LicenseError> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(LicenseError::Discovery(format!(
            "the 'checkouts' folder does not exist at {what}: {}",
            path.display()
        )))
    }
}

/// Find `<DerivedData>/<ProjectName>-<hash>/SourcePackages/checkouts`.
fn derived_data_checkouts(
    project: &Path,
    derived_data: Option<&Path>,
) -> Result<PathBuf, LicenseError> {
    let project_name = project
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            LicenseError::Discovery(format!("cannot derive project name from {}", project.display()))
        })?;

    let derived_data = derived_data.ok_or_else(|| {
        LicenseError::Discovery("cannot locate DerivedData without a home directory".to_string())
    })?;

    let mut entries: Vec<String> = std::fs::read_dir(derived_data)
        .map_err(|e| {
            LicenseError::Discovery(format!(
                "cannot read DerivedData at {}: {e}",
                derived_data.display()
            ))
        })?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    entries.sort();

    let project_dir = match_derived_data_dir(project_name, &entries).ok_or_else(|| {
        LicenseError::Discovery(format!(
            "no DerivedData directory found for project named {project_name}"
        ))
    })?;

    existing(
        derived_data
            .join(project_dir)
            .join("SourcePackages")
            .join("checkouts"),
        "derived path",
    )
}

/// Xcode names DerivedData folders `<ProjectName>-<lowercase hash>`. Prefer
/// entries of exactly that form; fall back to a plain prefix match.
fn match_derived_data_dir<'a>(project_name: &str, entries: &'a [String]) -> Option<&'a str> {
    let exact = Regex::new(&format!("^{}-[a-z]+$", regex::escape(project_name))).ok()?;
    entries
        .iter()
        .find(|e| exact.is_match(e))
        .or_else(|| entries.iter().find(|e| e.starts_with(project_name)))
        .map(String::as_str)
}

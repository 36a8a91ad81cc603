//! License discovery inside a directory of dependency checkouts.
//!
//! Every immediate subdirectory of the checkout root is one dependency's
//! source tree. Only the top level of each checkout is searched.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::config::ScanPolicy;
use crate::error::LicenseError;
use crate::models::LicenseCandidate;

/// Map each checkout directory name to the text of its license file.
pub fn scan(root: &Path, policy: &ScanPolicy) -> Result<BTreeMap<String, String>, LicenseError> {
    scan_with_progress(root, policy, &ProgressBar::hidden())
}

/// Same as [`scan`], ticking `progress` once per checkout.
pub fn scan_with_progress(
    root: &Path,
    policy: &ScanPolicy,
    progress: &ProgressBar,
) -> Result<BTreeMap<String, String>, LicenseError> {
    scan_checkouts_with(root, progress, |dir| scan_checkout(dir, policy))
}

/// Walk the checkouts under `root`, running `scan_one` on each.
///
/// Only failing to open `root` is fatal. A checkout `scan_one` rejects is
/// logged and left out of the map.
fn scan_checkouts_with<F>(
    root: &Path,
    progress: &ProgressBar,
    mut scan_one: F,
) -> Result<BTreeMap<String, String>, LicenseError>
where
    F: FnMut(&Path) -> Result<Option<LicenseCandidate>, LicenseError>,
{
    let checkouts: Vec<PathBuf> = list_entries(root)
        .map_err(|source| LicenseError::CheckoutRootUnreadable {
            path: root.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|(_, meta)| meta.is_dir())
        .map(|(path, _)| path)
        .collect();

    progress.set_length(checkouts.len() as u64);

    let mut licenses = BTreeMap::new();
    for dir in checkouts {
        progress.inc(1);

        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!(path = %dir.display(), "skipping checkout with a non UTF-8 name");
            continue;
        };

        match scan_one(&dir) {
            Ok(Some(candidate)) => {
                debug!(checkout = %name, file = %candidate.file_name, "found license file");
                licenses.insert(name, candidate.text);
            }
            Ok(None) => debug!(checkout = %name, "no license file"),
            Err(e) => warn!(checkout = %name, error = %e, "skipping checkout"),
        }
    }

    info!(
        root = %root.display(),
        found = licenses.len(),
        "scanned checkouts"
    );
    Ok(licenses)
}

/// Look for a license file at the top level of one checkout.
///
/// `Ok(None)` means the checkout was readable but holds no eligible file.
pub fn scan_checkout(
    dir: &Path,
    policy: &ScanPolicy,
) -> Result<Option<LicenseCandidate>, LicenseError> {
    let unreadable = |source| LicenseError::UnreadableSubdirectory {
        path: dir.to_path_buf(),
        source,
    };

    let files: Vec<PathBuf> = list_entries(dir)
        .map_err(unreadable)?
        .into_iter()
        .filter(|(_, meta)| meta.is_file())
        .map(|(path, _)| path)
        .collect();

    let Some(path) = find_license_file(&files, policy) else {
        return Ok(None);
    };

    let bytes = std::fs::read(path).map_err(unreadable)?;
    Ok(Some(LicenseCandidate {
        file_name: file_name_of(path),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    }))
}

/// Entries of `dir` with their metadata (symlinks followed), sorted by path.
///
/// Entries that cannot be listed or stat'ed are logged and skipped; only
/// failing to open `dir` itself is an error.
fn list_entries(dir: &Path) -> std::io::Result<Vec<(PathBuf, Metadata)>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        match std::fs::metadata(&path) {
            Ok(meta) => entries.push((path, meta)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping entry with unreadable metadata"),
        }
    }
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(entries)
}

/// Pick the license file among `files`.
///
/// One pass per search term, in order; the first pass with a hit wins, and
/// within a pass the first eligible file in `files` order wins. Matching is
/// case-insensitive on the file name, and only the policy's extensions are
/// eligible.
pub fn find_license_file<'a>(files: &'a [PathBuf], policy: &ScanPolicy) -> Option<&'a Path> {
    policy.search_terms.iter().find_map(|term| {
        files
            .iter()
            .find(|path| {
                file_name_of(path).to_lowercase().contains(term.as_str())
                    && has_eligible_extension(path, policy)
            })
            .map(PathBuf::as_path)
    })
}

fn has_eligible_extension(path: &Path, policy: &ScanPolicy) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    policy.extensions.iter().any(|allowed| *allowed == ext)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

use std::path::Path;

use crate::error::LicenseError;
use crate::models::Dependency;

/// Render the report as a pretty-printed JSON array.
///
/// Keys appear in [`Dependency`] field order; unset `version` and `license`
/// are left out rather than written as `null`. Output ends with a newline.
pub fn serialize(report: &[Dependency]) -> Result<Vec<u8>, LicenseError> {
    let mut bytes = serde_json::to_vec_pretty(report)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize `report` and write it to `path`, creating parent directories.
pub fn write(report: &[Dependency], path: &Path) -> Result<(), LicenseError> {
    let bytes = serialize(report)?;
    let io_err = |source| LicenseError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}

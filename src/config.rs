use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LicenseError;

/// Root configuration structure, deserialized from `.spm-licenses/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// How license files are picked inside a checkout.
    #[serde(default)]
    pub scan: ScanPolicy,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Defines which files in a checkout count as its license.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanPolicy {
    /// Substrings searched for in file names, one pass per entry, in order.
    /// Defaults to `["license", "copying"]`.
    #[serde(default = "default_search_terms")]
    pub search_terms: Vec<String>,
    /// Eligible file extensions without the leading dot; `""` means no
    /// extension. Defaults to `["", "txt", "md"]`.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Report path used when `--output-json-file` is not given.
    pub path: Option<PathBuf>,
}

fn default_search_terms() -> Vec<String> {
    vec!["license".to_string(), "copying".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec![String::new(), "txt".to_string(), "md".to_string()]
}

impl Default for ScanPolicy {
    fn default() -> Self {
        ScanPolicy {
            search_terms: default_search_terms(),
            extensions: default_extensions(),
        }
    }
}

impl ScanPolicy {
    /// Lowercase every entry and strip leading dots from extensions, so
    /// `".TXT"` in a config file behaves like `"txt"`.
    fn normalized(self) -> Self {
        ScanPolicy {
            search_terms: self
                .search_terms
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
            extensions: self
                .extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_dir>/.spm-licenses/config.toml`
/// 3. `~/.config/spm-licenses/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_dir: &Path, config_override: Option<&Path>) -> Result<Config, LicenseError> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_dir.join(".spm-licenses").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("spm-licenses")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, LicenseError> {
    let content = std::fs::read_to_string(path).map_err(|source| LicenseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| LicenseError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Config {
        scan: config.scan.normalized(),
        output: config.output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_policy() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.search_terms, ["license", "copying"]);
        assert_eq!(policy.extensions, ["", "txt", "md"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[output]
path = "build/licenses.json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.scan.search_terms, ["license", "copying"]);
        assert_eq!(cfg.output.path, Some(PathBuf::from("build/licenses.json")));
    }

    #[test]
    fn test_override_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[scan]
search_terms = ["LICENSE", "Notice"]
extensions = ["", ".TXT"]
"#,
        )
        .unwrap();

        let cfg = load_config(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(cfg.scan.search_terms, ["license", "notice"]);
        assert_eq!(cfg.scan.extensions, ["", "txt"]);
    }

    #[test]
    fn test_project_config_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".spm-licenses")).unwrap();
        fs::write(
            dir.path().join(".spm-licenses").join("config.toml"),
            "[output]\npath = \"out.json\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.output.path, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[scan]\nsearch_terms = 3\n").unwrap();
        let err = load_config(dir.path(), Some(path.as_path())).unwrap_err();
        assert!(matches!(err, LicenseError::Config { .. }));
    }
}

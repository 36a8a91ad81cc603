use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::LicenseError;
use crate::models::{Dependency, MergedReport};

/// Derive the checkout directory name of a dependency from its URL: the last
/// path segment with a trailing `.git` removed.
///
/// `https://github.com/org/Foo.git` → `Foo`, and scp-style SSH locations
/// work too: `git@github.com:org/Foo.git` → `Foo`.
pub fn repository_name(url: &str) -> Result<String, LicenseError> {
    let unparseable = |reason: String| LicenseError::UnparseableDependencyUrl {
        url: url.to_string(),
        reason,
    };

    let last = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(url::ParseError::RelativeUrlWithoutBase) => match scp_path(url) {
            Some(path) => path
                .split('/')
                .filter(|s| !s.is_empty())
                .last()
                .map(str::to_string),
            None => {
                return Err(unparseable(
                    url::ParseError::RelativeUrlWithoutBase.to_string(),
                ))
            }
        },
        Err(e) => return Err(unparseable(e.to_string())),
    }
    .ok_or_else(|| unparseable("no path segments".to_string()))?;

    let name = last.strip_suffix(".git").unwrap_or(&last);
    if name.is_empty() {
        return Err(unparseable("empty repository name".to_string()));
    }
    Ok(name.to_string())
}

/// Path part of an scp-style git location, `[user@]host:path`.
fn scp_path(location: &str) -> Option<&str> {
    if location.chars().any(char::is_whitespace) {
        return None;
    }
    let (authority, path) = location.split_once(':')?;
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if host.is_empty() || authority.contains('/') || path.is_empty() {
        return None;
    }
    Some(path)
}

/// Attach license texts to dependencies, keeping their order.
///
/// Each dependency looks up its own [`repository_name`] in `licenses`
/// (exact, case-sensitive). A dependency without a match keeps `license`
/// unset.
pub fn merge(dependencies: Vec<Dependency>, licenses: &BTreeMap<String, String>) -> MergedReport {
    dependencies
        .into_iter()
        .map(|mut dep| {
            match repository_name(&dep.url) {
                Ok(key) => match licenses.get(&key) {
                    Some(text) => dep.license = Some(text.clone()),
                    None => debug!(dependency = %dep.name, checkout = %key, "no license for checkout"),
                },
                Err(e) => warn!(dependency = %dep.name, error = %e, "cannot match dependency to a checkout"),
            }
            dep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn licenses(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(repository_name("https://github.com/org/Foo.git").unwrap(), "Foo");
        assert_eq!(repository_name("https://github.com/org/Foo").unwrap(), "Foo");
        assert_eq!(repository_name("https://github.com/org/Foo/").unwrap(), "Foo");
        assert_eq!(repository_name("ssh://git@host/org/bar.git").unwrap(), "bar");
        assert_eq!(repository_name("git@github.com:org/Foo.git").unwrap(), "Foo");
        assert_eq!(repository_name("git@gitlab.com:group/sub/baz").unwrap(), "baz");
        // only a trailing suffix is stripped
        assert_eq!(
            repository_name("https://example.com/my.github.tools.git").unwrap(),
            "my.github.tools"
        );
    }

    #[test]
    fn test_repository_name_errors() {
        for url in [
            "not a url",
            "https://github.com/",
            "https://github.com/.git",
            "mailto:a@b.c",
            "git@github.com:",
            "git@github.com:org/.git",
            "org/Foo.git",
        ] {
            assert!(
                matches!(
                    repository_name(url),
                    Err(LicenseError::UnparseableDependencyUrl { .. })
                ),
                "{url} should not yield a name"
            );
        }
    }

    #[test]
    fn test_merge_matches_by_repository_name() {
        let deps = vec![
            Dependency::new("foo", "https://github.com/org/Foo.git", Some("1.0.0".into())),
            Dependency::new("bar", "https://github.com/org/bar", None),
            Dependency::new("broken", "not a url", None),
        ];
        let map = licenses(&[("Foo", "MIT"), ("Bar", "Apache")]);

        let merged = merge(deps, &map);
        let names: Vec<_> = merged.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["foo", "bar", "broken"]);
        assert_eq!(merged[0].license.as_deref(), Some("MIT"));
        // lookup is case-sensitive
        assert_eq!(merged[1].license, None);
        assert_eq!(merged[2].license, None);
    }

    #[test]
    fn test_same_checkout_shared_by_two_pins() {
        let deps = vec![
            Dependency::new("a", "https://github.com/org/Foo.git", None),
            Dependency::new("b", "https://gitlab.com/other/Foo", None),
        ];
        let merged = merge(deps, &licenses(&[("Foo", "MIT")]));
        assert!(merged.iter().all(|d| d.license.as_deref() == Some("MIT")));
    }

    #[test]
    fn test_merge_scp_style_location() {
        let deps = vec![Dependency::new("foo", "git@github.com:org/Foo.git", Some("1.0.0".into()))];
        let merged = merge(deps, &licenses(&[("Foo", "MIT")]));
        assert_eq!(merged[0].license.as_deref(), Some("MIT"));
    }
}

//! GitHub repository URL parsing and raw/blob URL construction.

use std::sync::OnceLock;

use regex::Regex;

use super::types::RepositoryRef;

const GITHUB_WEB_BASE: &str = "https://github.com";

fn repo_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://github\.com/([^/?#]+)/([^/?#]+)").expect("valid repository regex")
    })
}

/// Extract `(owner, name)` from a `https://github.com/<owner>/<name>[.git][...]` URL.
///
/// Returns `None` when the input does not have that shape. A trailing `.git`
/// on the name segment is stripped.
pub fn parse_github_url(input: &str) -> Option<RepositoryRef> {
    let caps = repo_url_pattern().captures(input.trim())?;
    let owner = caps.get(1)?.as_str();
    let raw_name = caps.get(2)?.as_str();
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);

    if name.is_empty() {
        return None;
    }

    Some(RepositoryRef::new(owner, name))
}

/// Percent-encode the characters the raw content host rejects in a path.
///
/// Only spaces are encoded; slashes keep their meaning as separators.
pub fn encode_path(path: &str) -> String {
    path.replace(' ', "%20")
}

/// Build the raw-content URL for a file on a branch.
///
/// `raw_base` is the raw content host, e.g. `https://raw.githubusercontent.com/`.
pub fn raw_file_url(raw_base: &str, repo: &RepositoryRef, branch: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        raw_base.trim_end_matches('/'),
        repo.owner,
        repo.name,
        branch,
        encode_path(path)
    )
}

/// Canonical browser URL of a file, shown in the single-file context header.
pub fn blob_page_url(repo: &RepositoryRef, branch: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/blob/{}/{}",
        GITHUB_WEB_BASE, repo.owner, repo.name, branch, path
    )
}

/// Browser URL of the repository itself.
pub fn repository_page_url(repo: &RepositoryRef) -> String {
    format!("{}/{}/{}", GITHUB_WEB_BASE, repo.owner, repo.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_url() {
        let repo = parse_github_url("https://github.com/acme/widgets").unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn test_parse_strips_git_suffix() {
        let repo = parse_github_url("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn test_parse_ignores_trailing_segments() {
        let repo = parse_github_url("https://github.com/acme/widgets/tree/dev/src").unwrap();
        assert_eq!(repo, RepositoryRef::new("acme", "widgets"));

        let repo = parse_github_url("https://github.com/acme/widgets?tab=readme").unwrap();
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn test_parse_keeps_dots_inside_name() {
        let repo = parse_github_url("https://github.com/acme/acme.github.io").unwrap();
        assert_eq!(repo.name, "acme.github.io");
    }

    #[test]
    fn test_parse_rejects_non_matching() {
        assert!(parse_github_url("").is_none());
        assert!(parse_github_url("not a url").is_none());
        assert!(parse_github_url("https://gitlab.com/acme/widgets").is_none());
        assert!(parse_github_url("https://github.com/acme").is_none());
        assert!(parse_github_url("https://github.com/acme/").is_none());
        assert!(parse_github_url("https://github.com/acme/.git").is_none());
        assert!(parse_github_url("see https://github.com/acme/widgets").is_none());
    }

    #[test]
    fn test_raw_file_url_encodes_spaces() {
        let repo = RepositoryRef::new("acme", "widgets");
        let url = raw_file_url(
            "https://raw.githubusercontent.com/",
            &repo,
            "main",
            "docs/user guide.md",
        );
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/acme/widgets/main/docs/user%20guide.md"
        );
    }

    #[test]
    fn test_blob_page_url() {
        let repo = RepositoryRef::new("acme", "widgets");
        assert_eq!(
            blob_page_url(&repo, "main", "widgets/core.go"),
            "https://github.com/acme/widgets/blob/main/widgets/core.go"
        );
        assert_eq!(
            repository_page_url(&repo),
            "https://github.com/acme/widgets"
        );
    }
}

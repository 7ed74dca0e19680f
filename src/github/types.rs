//! GitHub data types and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Owner/name pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Kind of a tree entry. Only blobs are retained in a file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    #[serde(other)]
    Other,
}

/// A single entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileEntry {
    #[cfg(test)]
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// `GET /repos/{owner}/{repo}` response (only the fields we read)
#[derive(Debug, Deserialize)]
pub(super) struct RepositoryMetadata {
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1` response
#[derive(Debug, Deserialize)]
pub(super) struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<FileEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// Error body returned by the GitHub REST API
#[derive(Debug, Deserialize)]
pub(super) struct GitHubErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Failure talking to GitHub or the raw content host.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{} (HTTP {status} from {url})", status_hint(.status, .message))]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("repository {0} did not report a default branch")]
    MissingDefaultBranch(String),

    #[error("no files found in {repo} on branch '{branch}'")]
    EmptyTree { repo: String, branch: String },
}

impl GitHubError {
    /// HTTP status code, if the failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Human hint for a GitHub HTTP status, falling back to the server message.
fn status_hint(status: &u16, message: &str) -> String {
    let lower = message.to_lowercase();
    match *status {
        401 => "Bad credentials. Check the GitHub token".to_string(),
        403 if lower.contains("rate limit") => {
            "GitHub API rate limit exceeded. Supply a token or wait and try again".to_string()
        }
        403 => "Access forbidden. The token may lack permission for this repository".to_string(),
        404 => "Not found. The repository or branch does not exist or is private".to_string(),
        409 => "The repository is empty".to_string(),
        429 => "Too many requests. Wait and try again".to_string(),
        _ if message.is_empty() => "GitHub request failed".to_string(),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_kind_deserialization() {
        let json = r#"[
            {"path": "src", "type": "tree", "mode": "040000"},
            {"path": "src/main.rs", "type": "blob", "size": 12},
            {"path": "vendor/lib", "type": "commit"}
        ]"#;
        let entries: Vec<FileEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].kind, EntryKind::Other);
        assert_eq!(entries[1], FileEntry::blob("src/main.rs"));
        assert_eq!(entries[2].kind, EntryKind::Other);
    }

    #[test]
    fn test_status_error_messages() {
        let err = GitHubError::Status {
            status: 404,
            url: "https://api.github.com/repos/a/b".to_string(),
            message: "Not Found".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("does not exist or is private"));
        assert!(text.contains("HTTP 404"));
        assert_eq!(err.status(), Some(404));

        let err = GitHubError::Status {
            status: 403,
            url: "u".to_string(),
            message: "API rate limit exceeded for 1.2.3.4".to_string(),
        };
        assert!(err.to_string().contains("rate limit"));

        let err = GitHubError::Status {
            status: 502,
            url: "u".to_string(),
            message: String::new(),
        };
        assert!(err.to_string().starts_with("GitHub request failed"));
    }

    #[test]
    fn test_repository_ref_display() {
        assert_eq!(RepositoryRef::new("acme", "widgets").to_string(), "acme/widgets");
    }
}

//! GitHub access: URL parsing, repository metadata, tree listing and raw file content.

mod client;
mod repo_url;
mod types;

pub use client::{GitHubClient, RepositorySource, DEFAULT_API_URL, DEFAULT_RAW_URL};
pub use repo_url::{blob_page_url, parse_github_url, raw_file_url, repository_page_url};
pub use types::{FileEntry, GitHubError, RepositoryRef};

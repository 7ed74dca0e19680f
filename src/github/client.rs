//! GitHub REST and raw-content client.

use std::future::Future;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use super::types::{
    FileEntry, GitHubError, GitHubErrorBody, RepositoryMetadata, RepositoryRef, TreeResponse,
};
use crate::http::{build_client, error_body};

/// Default GitHub REST API base
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// Default raw content host
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com/";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Where repository metadata, trees and file contents come from.
///
/// `GitHubClient` is the production implementation; the session handlers
/// are generic over this so they can run against in-memory repositories.
pub trait RepositorySource {
    /// Base URL of the raw content host, used to build per-file URLs.
    fn raw_base(&self) -> &str;

    /// Resolve the branch the provider designates as default.
    fn default_branch(
        &self,
        repo: &RepositoryRef,
        token: Option<&str>,
    ) -> impl Future<Output = Result<String, GitHubError>> + Send;

    /// List every regular file on `branch`, in the provider's order.
    fn list_files(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<FileEntry>, GitHubError>> + Send;

    /// Fetch the body of a raw-content URL as text.
    fn fetch_raw(&self, raw_url: &str) -> impl Future<Output = Result<String, GitHubError>> + Send;
}

/// HTTP client for the GitHub REST API and the raw content host.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    raw_base: String,
}

impl GitHubClient {
    /// Create a client against the given API and raw-content bases.
    pub fn new(api_base: &str, raw_base: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let api_base = parse_base(api_base)?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_base,
            raw_base: raw_base.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GitHubError> {
        self.api_base.join(path).map_err(|e| GitHubError::Decode {
            url: format!("{}{}", self.api_base, path),
            reason: format!("invalid endpoint URL: {}", e),
        })
    }

    /// GET a JSON document from the REST API.
    async fn get_json<T>(&self, url: Url, token: Option<&str>) -> Result<T, GitHubError>
    where
        T: DeserializeOwned,
    {
        debug!("=== GitHub Request ===");
        debug!("URL: {}", url);

        let mut request = self.client.get(url.clone()).header("Accept", GITHUB_ACCEPT);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.header("Authorization", format!("token {}", token));
        }

        let response = request.send().await.map_err(|source| GitHubError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!("Status: {}", status);

        if !status.is_success() {
            let body = error_body(response).await;
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            error!("GitHub request failed with status {}: {}", status, message);
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let text = response.text().await.map_err(|source| GitHubError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| GitHubError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl RepositorySource for GitHubClient {
    fn raw_base(&self) -> &str {
        &self.raw_base
    }

    async fn default_branch(
        &self,
        repo: &RepositoryRef,
        token: Option<&str>,
    ) -> Result<String, GitHubError> {
        let url = self.endpoint(&format!("repos/{}/{}", repo.owner, repo.name))?;
        let metadata: RepositoryMetadata = self.get_json(url, token).await?;

        match metadata.default_branch {
            Some(branch) if !branch.is_empty() => {
                debug!("Default branch of {}: {}", repo, branch);
                Ok(branch)
            }
            _ => Err(GitHubError::MissingDefaultBranch(repo.to_string())),
        }
    }

    async fn list_files(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        token: Option<&str>,
    ) -> Result<Vec<FileEntry>, GitHubError> {
        let mut url = self.endpoint(&format!(
            "repos/{}/{}/git/trees/{}",
            repo.owner, repo.name, branch
        ))?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response: TreeResponse = self.get_json(url, token).await?;
        if response.truncated {
            warn!(
                "Tree listing for {} was truncated by GitHub; some files are missing",
                repo
            );
        }

        let total = response.tree.len();
        let files: Vec<FileEntry> = response.tree.into_iter().filter(FileEntry::is_blob).collect();
        debug!("Tree has {} entries, {} files", total, files.len());
        Ok(files)
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String, GitHubError> {
        debug!("Fetching raw content: {}", raw_url);

        let response = self
            .client
            .get(raw_url)
            .send()
            .await
            .map_err(|source| GitHubError::Transport {
                url: raw_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_body(response).await.trim().to_string();
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url: raw_url.to_string(),
                message,
            });
        }

        response.text().await.map_err(|source| GitHubError::Transport {
            url: raw_url.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base.as_str())
            .field("raw_base", &self.raw_base)
            .finish()
    }
}

/// Parse an API base URL, making sure relative joins append to its path.
fn parse_base(base: &str) -> anyhow::Result<Url> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&normalized).map_err(|e| anyhow::anyhow!("Invalid base URL {}: {}", base, e))
}

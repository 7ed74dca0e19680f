//! Runtime configuration.
//!
//! Values come from CLI flags, falling back to environment variables, which
//! may themselves come from a `.env` file in the working directory.

use anyhow::Result;
use tracing::{debug, warn};

use crate::assistant::Assistant;
use crate::cli::Cli;
use crate::github::GitHubClient;
use crate::llm::GeminiClient;

/// The production assistant: GitHub for code, Gemini for answers
pub type RepoAssistant = Assistant<GitHubClient, GeminiClient>;

/// Outcome of reading `.env`, reported once logging is up
pub type DotenvStatus = Result<std::path::PathBuf, dotenvy::Error>;

/// Load `.env` into the process environment.
///
/// Must run before CLI parsing so `env` fallbacks see the values.
pub fn load_dotenv() -> DotenvStatus {
    dotenvy::dotenv()
}

/// Log how `.env` loading went. A missing file is normal.
pub fn report_dotenv(status: &DotenvStatus) {
    match status {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }
}

/// Resolved runtime configuration
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub raw_content_url: String,
    pub gemini_api_url: String,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_key: non_empty(cli.api_key.clone()),
            model: cli.model.clone(),
            github_token: non_empty(cli.github_token.clone()),
            github_api_url: cli.github_api_url.clone(),
            raw_content_url: cli.raw_content_url.clone(),
            gemini_api_url: cli.gemini_api_url.clone(),
            timeout_secs: cli.timeout_secs,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the GitHub and Gemini clients.
    pub fn build_assistant(&self) -> Result<RepoAssistant> {
        let github = GitHubClient::new(
            &self.github_api_url,
            &self.raw_content_url,
            self.timeout_secs,
        )?;
        let gemini = GeminiClient::new(
            &self.gemini_api_url,
            self.model.clone(),
            self.api_key.clone(),
            self.timeout_secs,
        )?;
        Ok(Assistant::new(github, gemini))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("github_api_url", &self.github_api_url)
            .field("raw_content_url", &self.raw_content_url)
            .field("gemini_api_url", &self.gemini_api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["repochat"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--api-key",
            "k",
            "--model",
            "gemini-1.5-pro",
            "--github-api-url",
            "http://localhost:9000",
            "--timeout-secs",
            "7",
        ]);
        let config = Config::from_cli(&cli);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.github_api_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, Some(7));
        assert!(config.build_assistant().is_ok());
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let cli = parse(&["--api-key", "  ", "--github-token", ""]);
        let config = Config::from_cli(&cli);
        assert!(!config.has_api_key());
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let cli = parse(&["--api-key", "sk-secret", "--github-token", "ghp_secret"]);
        let debug_str = format!("{:?}", Config::from_cli(&cli));
        assert!(!debug_str.contains("sk-secret"));
        assert!(!debug_str.contains("ghp_secret"));
    }
}

//! Shared HTTP client construction.
//!
//! Both the GitHub client and the Gemini client go through here so they
//! agree on the User-Agent and timeout policy.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

/// Default version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string.
///
/// GitHub rejects API requests that do not carry one.
pub fn build_user_agent() -> String {
    std::env::var("REPOCHAT_USER_AGENT")
        .unwrap_or_else(|_| format!("repochat/{}", DEFAULT_VERSION))
}

/// Build a `reqwest::Client`.
///
/// With `timeout_secs == None` no timeout is configured and the transport
/// default applies.
pub fn build_client(timeout_secs: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(build_user_agent());
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to build HTTP client")
}

/// Read a failed response's body, tolerating read errors.
pub async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

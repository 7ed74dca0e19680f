//! MCP tool parameter types.
//!
//! These types are used with rmcp's `Parameters<T>` wrapper for automatic
//! deserialization and JSON schema generation.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the load_repository tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoadRepositoryArgs {
    /// Repository URL, e.g. https://github.com/owner/name
    pub url: String,
    /// Optional GitHub personal access token (falls back to GITHUB_TOKEN)
    #[serde(default)]
    pub github_token: Option<String>,
}

/// Parameters for the list_files tool (no arguments needed)
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFilesArgs {}

/// Parameters for the select_file tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SelectFileArgs {
    /// Path of the file within the repository, as returned by list_files
    pub path: String,
}

/// Parameters for the load_full_repository tool (no arguments needed)
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoadFullRepositoryArgs {}

/// Parameters for the ask tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AskArgs {
    /// The question about the loaded code
    pub question: String,
}

/// Parameters for the get_transcript tool (no arguments needed)
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTranscriptArgs {}

/// Parameters for the clear tool (no arguments needed)
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClearArgs {}

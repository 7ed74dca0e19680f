use clap::{Parser, Subcommand};

use crate::github::{DEFAULT_API_URL, DEFAULT_RAW_URL};
use crate::llm::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};

/// RepoChat - ask questions about a GitHub repository's code
#[derive(Parser)]
#[command(name = "repochat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as MCP server over stdio
    #[arg(long)]
    pub mcp: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Select model to use
    #[arg(short = 'm', long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// GitHub personal access token (raises rate limits, reaches private repos)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, default_value = DEFAULT_API_URL, hide = true)]
    pub github_api_url: String,

    /// Raw file content base URL
    #[arg(long, default_value = DEFAULT_RAW_URL, hide = true)]
    pub raw_content_url: String,

    /// Gemini API base URL
    #[arg(long, default_value = DEFAULT_GEMINI_URL, hide = true)]
    pub gemini_api_url: String,

    /// Per-request timeout in seconds (no timeout when absent)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat about a repository (the default)
    Chat,
    /// List the files of a repository's default branch
    Files {
        /// Repository URL, e.g. https://github.com/owner/name
        url: String,
    },
    /// Ask one question and stream the answer
    Ask {
        /// Repository URL, e.g. https://github.com/owner/name
        url: String,

        /// Use only this file as context (full repository when absent)
        #[arg(short, long)]
        file: Option<String>,

        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
}

//! MCP tool implementations.
//!
//! Each tool takes the shared chat state, runs one assistant action under
//! the session lock, and renders its outcome. Actions work on a copy of the
//! session, so a call that is cancelled midway leaves it as it was.

mod chat;
mod common;
mod repository;

// Re-export tool functions
pub use chat::{ask, clear, get_transcript};
pub use repository::{list_files, load_full_repository, load_repository, select_file};

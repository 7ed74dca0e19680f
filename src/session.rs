//! Chat session state.
//!
//! One explicit record holds everything a user builds up: the repository,
//! its branch and file list, the active context, and the transcript for
//! that context. Fields are only changed through the methods below so the
//! context and transcript invariants hold after every action.

use uuid::Uuid;

use crate::context::ActiveContext;
use crate::conversation::{Conversation, Role};
use crate::github::{FileEntry, RepositoryRef};

/// Session data for one user
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    repository: Option<RepositoryRef>,
    branch: Option<String>,
    files: Vec<FileEntry>,
    context: Option<ActiveContext>,
    transcript: Conversation,
}

impl Default for Session {
    /// An empty session: no repository, no files, no context, empty transcript.
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            repository: None,
            branch: None,
            files: Vec::new(),
            context: None,
            transcript: Conversation::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session identifier, used to correlate log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn repository(&self) -> Option<&RepositoryRef> {
        self.repository.as_ref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn context(&self) -> Option<&ActiveContext> {
        self.context.as_ref()
    }

    pub fn transcript(&self) -> &Conversation {
        &self.transcript
    }

    /// Look up a loaded file entry by exact path
    pub fn find_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Drop everything and start over
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Install a freshly loaded repository.
    ///
    /// Any previous context and transcript belonged to the old file list and
    /// are dropped.
    pub(crate) fn set_repository(
        &mut self,
        repository: RepositoryRef,
        branch: String,
        files: Vec<FileEntry>,
    ) {
        self.repository = Some(repository);
        self.branch = Some(branch);
        self.files = files;
        self.context = None;
        self.transcript.clear();
    }

    /// Switch the active context. Replaces whichever mode was active and
    /// empties the transcript.
    pub(crate) fn set_context(&mut self, context: ActiveContext) {
        self.context = Some(context);
        self.transcript.clear();
    }

    pub(crate) fn record(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.append(role, content);
    }

    /// What the user must do before a question can be asked.
    pub fn readiness(&self, generator_configured: bool) -> Readiness {
        if !generator_configured {
            Readiness::MissingApiKey
        } else if self.repository.is_none() || self.files.is_empty() {
            Readiness::NoRepository
        } else if self.context.is_none() {
            Readiness::NoContext
        } else {
            Readiness::Ready
        }
    }
}

/// Whether the session can accept a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    MissingApiKey,
    NoRepository,
    NoContext,
    Ready,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    /// Guidance shown to the user
    pub fn hint(&self) -> &'static str {
        match self {
            Readiness::MissingApiKey => {
                "Please set GEMINI_API_KEY (environment or .env) to ask questions."
            }
            Readiness::NoRepository => {
                "Enter a GitHub URL and load the repository contents first."
            }
            Readiness::NoContext => {
                "Load a single file or the full repository code to begin."
            }
            Readiness::Ready => "Ask your question about the codebase.",
        }
    }
}

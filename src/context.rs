//! Model context assembly.
//!
//! A context is either one loaded file or the whole repository concatenated
//! into annotated blocks. Never both.

use tracing::{debug, info, warn};

use crate::github::{raw_file_url, repository_page_url, FileEntry, RepositoryRef, RepositorySource};

/// Language tag used when a path has no usable extension
pub const PLAINTEXT: &str = "plaintext";

/// Derive a code-fence language tag from a path or URL.
///
/// Takes the text after the last `.` of the final path segment, with any
/// query string removed, lowercased. Dotfiles like `.gitignore` and
/// extensionless names fall back to [`PLAINTEXT`].
pub fn file_extension(path: &str) -> String {
    let without_query = path.split(['?', '#']).next().unwrap_or_default();
    let file_name = without_query.rsplit('/').next().unwrap_or_default();

    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name[idx + 1..].to_lowercase(),
        _ => PLAINTEXT.to_string(),
    }
}

/// A single fetched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub path: String,
    pub content: String,
    pub extension: String,
}

impl LoadedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let extension = file_extension(&path);
        Self {
            path,
            content: content.into(),
            extension,
        }
    }

    /// The content wrapped in a fenced code block tagged with its language.
    pub fn fenced(&self) -> String {
        format!("```{}\n{}\n```", self.extension, self.content)
    }
}

/// Annotated block for one file of a full-repository context.
pub fn file_block(file: &LoadedFile) -> String {
    format!(
        "\n\n--- FILE: {} ({}) ---\n{}",
        file.path,
        file.extension,
        file.fenced()
    )
}

/// Placeholder block for a file whose fetch failed.
pub fn failure_block(path: &str, reason: &str) -> String {
    format!(
        "\n\n--- FILE: {} (fetch failed) ---\n[Could not fetch this file: {}]",
        path, reason
    )
}

/// The whole repository concatenated into one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledRepository {
    pub text: String,
    /// Number of files fetched successfully
    pub loaded: usize,
    /// Paths recorded as failure placeholders
    pub failed: Vec<String>,
}

/// Fetch every file in order and concatenate them.
///
/// Fetches run one after another. A failing file becomes a placeholder
/// block and the loop carries on; nothing here aborts early.
pub async fn assemble_repository<S>(
    source: &S,
    repo: &RepositoryRef,
    branch: &str,
    files: &[FileEntry],
) -> AssembledRepository
where
    S: RepositorySource,
{
    let mut assembled = AssembledRepository::default();

    for (index, entry) in files.iter().enumerate() {
        let raw_url = raw_file_url(source.raw_base(), repo, branch, &entry.path);
        debug!("[{}/{}] Fetching {}", index + 1, files.len(), entry.path);

        match source.fetch_raw(&raw_url).await {
            Ok(content) => {
                let file = LoadedFile::new(entry.path.clone(), content);
                assembled.text.push_str(&file_block(&file));
                assembled.loaded += 1;
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", entry.path, e);
                assembled.text.push_str(&failure_block(&entry.path, &e.to_string()));
                assembled.failed.push(entry.path.clone());
            }
        }
    }

    info!(
        "Assembled {} files from {} ({} failed, {} bytes)",
        assembled.loaded,
        repo,
        assembled.failed.len(),
        assembled.text.len()
    );
    assembled
}

/// The source text currently supplied to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveContext {
    /// One file, with its canonical browser URL
    SingleFile { file: LoadedFile, page_url: String },
    /// The concatenated repository
    Repository(AssembledRepository),
}

impl ActiveContext {
    /// Short description for status lines.
    pub fn describe(&self) -> String {
        match self {
            ActiveContext::SingleFile { file, .. } => format!("file {}", file.path),
            ActiveContext::Repository(assembled) => {
                format!("full repository ({} files)", assembled.loaded)
            }
        }
    }
}

/// Build the system instruction for one question.
///
/// It is rebuilt from the active context on every turn; earlier turns are
/// not replayed.
pub fn system_instruction(repo: &RepositoryRef, context: &ActiveContext) -> String {
    let (header, body) = match context {
        ActiveContext::Repository(assembled) => (
            format!(
                "Here is the full codebase from {}:",
                repository_page_url(repo)
            ),
            assembled.text.clone(),
        ),
        ActiveContext::SingleFile { file, page_url } => {
            (format!("Here is the file: {}", page_url), file.fenced())
        }
    };

    format!(
        "\nYou are an expert AI programming assistant.\n\n{}\n\n{}\n\n\
         Answer only based on the above code. Be concise, helpful, and provide code samples in markdown if needed.\n",
        header, body
    )
}

//! Per-action handlers.
//!
//! Every user action is one handler call: it takes the current [`Session`],
//! runs to completion, and returns the next session plus the messages to
//! show. Handlers never fail; errors come back as [`Effect::Error`].

use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use crate::context::{assemble_repository, system_instruction, ActiveContext, LoadedFile};
use crate::conversation::Role;
use crate::github::{
    blob_page_url, parse_github_url, raw_file_url, GitHubError, RepositoryRef, RepositorySource,
};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::session::{Readiness, Session};

/// Marker appended to a partial answer while it is still streaming
pub const CURSOR: &str = "▌";

/// Something the front end should show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Effect {
    pub fn message(&self) -> &str {
        match self {
            Effect::Success(m) | Effect::Info(m) | Effect::Warning(m) | Effect::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Effect::Error(_))
    }
}

/// Result of one action
#[derive(Debug)]
pub struct Outcome {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn new(session: Session, effect: Effect) -> Self {
        Self {
            session,
            effects: vec![effect],
        }
    }

    /// Whether any effect reports an error
    pub fn has_error(&self) -> bool {
        self.effects.iter().any(Effect::is_error)
    }
}

/// Repository chat assistant: a repository source plus a text generator.
pub struct Assistant<S, G> {
    source: S,
    generator: G,
}

impl<S, G> Assistant<S, G>
where
    S: RepositorySource,
    G: TextGenerator,
{
    pub fn new(source: S, generator: G) -> Self {
        Self { source, generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Parse `url`, resolve the default branch and list its files.
    ///
    /// The session is only touched when every step succeeds.
    pub async fn load_repository(
        &self,
        mut session: Session,
        url: &str,
        token: Option<&str>,
    ) -> Outcome {
        let Some(repo) = parse_github_url(url) else {
            return Outcome::new(session, Effect::Error("Invalid GitHub URL.".to_string()));
        };
        info!(session = %session.id(), "Loading repository {}", repo);

        let branch = match self.source.default_branch(&repo, token).await {
            Ok(branch) => branch,
            Err(e) => {
                error!(status = ?e.status(), "Error fetching branch for {}: {}", repo, e);
                return Outcome::new(session, Effect::Error(format!("Error fetching branch: {}", e)));
            }
        };

        let files = match self.source.list_files(&repo, &branch, token).await {
            Ok(files) if files.is_empty() => {
                let e = GitHubError::EmptyTree {
                    repo: repo.to_string(),
                    branch: branch.clone(),
                };
                warn!("{}", e);
                return Outcome::new(
                    session,
                    Effect::Error(format!("Could not retrieve files: {}", e)),
                );
            }
            Ok(files) => files,
            Err(e) => {
                error!(status = ?e.status(), "Error fetching files for {}: {}", repo, e);
                return Outcome::new(session, Effect::Error(format!("Error fetching files: {}", e)));
            }
        };

        let message = format!("{} files found in branch '{}'", files.len(), branch);
        info!("{}: {}", repo, message);
        session.set_repository(repo, branch, files);
        Outcome::new(session, Effect::Success(message))
    }

    /// Load one file as the active context.
    pub async fn select_file(&self, mut session: Session, path: &str) -> Outcome {
        let Some((repo, branch)) = loaded_repository(&session) else {
            return Outcome::new(session, Effect::Warning(Readiness::NoRepository.hint().to_string()));
        };

        if session.find_file(path).is_none() {
            return Outcome::new(
                session,
                Effect::Error(format!("File not found in repository: {}", path)),
            );
        }

        let raw_url = raw_file_url(self.source.raw_base(), &repo, &branch, path);
        let content = match self.source.fetch_raw(&raw_url).await {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to load {}: {}", path, e);
                return Outcome::new(session, Effect::Error(format!("Failed to load file: {}", e)));
            }
        };

        let page_url = blob_page_url(&repo, &branch, path);
        info!(session = %session.id(), "Loaded {} ({} bytes)", path, content.len());
        session.set_context(ActiveContext::SingleFile {
            file: LoadedFile::new(path, content),
            page_url,
        });
        Outcome::new(session, Effect::Success(format!("Loaded {}", path)))
    }

    /// Fetch every file and make the concatenation the active context.
    ///
    /// Runs to completion; individual fetch failures become placeholders.
    pub async fn load_full_repository(&self, mut session: Session) -> Outcome {
        let Some((repo, branch)) = loaded_repository(&session) else {
            return Outcome::new(session, Effect::Warning(Readiness::NoRepository.hint().to_string()));
        };

        if session.files().is_empty() {
            return Outcome::new(session, Effect::Warning(Readiness::NoRepository.hint().to_string()));
        }

        let assembled = assemble_repository(&self.source, &repo, &branch, session.files()).await;

        let mut effects = vec![Effect::Success(format!(
            "Full repository loaded ({} files)",
            assembled.loaded
        ))];
        if !assembled.failed.is_empty() {
            effects.push(Effect::Warning(format!(
                "{} file(s) could not be fetched: {}",
                assembled.failed.len(),
                assembled.failed.join(", ")
            )));
        }

        session.set_context(ActiveContext::Repository(assembled));
        Outcome { session, effects }
    }

    /// Answer a question about the active context.
    ///
    /// `on_update` receives the text to display each time it changes: the
    /// partial answer with [`CURSOR`] while streaming, then the final text.
    /// The user question and the final text (or the error shown instead)
    /// are committed to the transcript.
    pub async fn ask<F>(&self, mut session: Session, question: &str, mut on_update: F) -> Outcome
    where
        F: FnMut(&str) + Send,
    {
        let question = question.trim();
        if question.is_empty() {
            return Outcome::new(session, Effect::Error("Question is empty.".to_string()));
        }

        let readiness = session.readiness(self.generator.is_configured());
        if !readiness.is_ready() {
            return Outcome::new(session, Effect::Warning(readiness.hint().to_string()));
        }
        let Some(request) = build_request(&session, question) else {
            return Outcome::new(session, Effect::Warning(Readiness::NoContext.hint().to_string()));
        };
        session.record(Role::User, question);
        info!(
            session = %session.id(),
            "Asking {} about {}",
            self.generator.model(),
            context_label(&session)
        );

        let mut answer = String::new();
        let mut failure = None;

        match self.generator.stream_generate(&request).await {
            Ok(mut stream) => {
                while let Some(fragment) = stream.next().await {
                    match fragment {
                        Ok(text) => {
                            answer.push_str(&text);
                            on_update(&format!("{}{}", answer, CURSOR));
                        }
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
            }
            Err(e) => failure = Some(e),
        }

        match failure {
            Some(e) => {
                error!("Generation failed: {}", e);
                let shown = format!("Error occurred: {}", e);
                on_update(&shown);
                session.record(Role::Assistant, shown);
                Outcome::new(session, Effect::Error(format!("Error: {}", e)))
            }
            None => {
                on_update(&answer);
                session.record(Role::Assistant, answer);
                debug!(
                    "Answer complete, transcript has {} messages",
                    session.transcript().len()
                );
                Outcome {
                    session,
                    effects: Vec::new(),
                }
            }
        }
    }

    /// Reset the session to empty.
    pub fn clear(&self, mut session: Session) -> Outcome {
        session.reset();
        Outcome::new(session, Effect::Info("Cleared all repository state and chat history.".to_string()))
    }
}

/// Repository and branch of a loaded session, as owned values.
fn loaded_repository(session: &Session) -> Option<(RepositoryRef, String)> {
    Some((session.repository()?.clone(), session.branch()?.to_string()))
}

fn build_request(session: &Session, question: &str) -> Option<GenerationRequest> {
    let repo = session.repository()?;
    let context = session.context()?;
    Some(GenerationRequest {
        system_instruction: system_instruction(repo, context),
        prompt: question.to_string(),
    })
}

fn context_label(session: &Session) -> String {
    session
        .context()
        .map(ActiveContext::describe)
        .unwrap_or_else(|| "nothing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::FileEntry;
    use crate::llm::{FragmentStream, GenerationError};
    use futures_util::stream;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const RAW: &str = "https://raw.test";

    /// In-memory repository
    #[derive(Default)]
    struct FakeSource {
        branch: Option<String>,
        tree: Vec<FileEntry>,
        contents: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn widgets() -> Self {
            let mut contents = HashMap::new();
            contents.insert(
                format!("{}/acme/widgets/main/widgets/core.go", RAW),
                "package widgets\n\nfunc Spin() {}\n".to_string(),
            );
            contents.insert(
                format!("{}/acme/widgets/main/README.md", RAW),
                "# Widgets\n".to_string(),
            );
            contents.insert(
                format!("{}/acme/widgets/main/docs/user%20guide.md", RAW),
                "Spin the widget.\n".to_string(),
            );
            Self {
                branch: Some("main".to_string()),
                tree: vec![
                    FileEntry::blob("README.md"),
                    FileEntry::blob("widgets/core.go"),
                    FileEntry::blob("widgets/broken.bin"),
                    FileEntry::blob("docs/user guide.md"),
                ],
                contents,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl RepositorySource for FakeSource {
        fn raw_base(&self) -> &str {
            RAW
        }

        async fn default_branch(
            &self,
            repo: &RepositoryRef,
            _token: Option<&str>,
        ) -> Result<String, GitHubError> {
            self.branch
                .clone()
                .ok_or_else(|| GitHubError::MissingDefaultBranch(repo.to_string()))
        }

        async fn list_files(
            &self,
            _repo: &RepositoryRef,
            _branch: &str,
            _token: Option<&str>,
        ) -> Result<Vec<FileEntry>, GitHubError> {
            Ok(self.tree.clone())
        }

        async fn fetch_raw(&self, raw_url: &str) -> Result<String, GitHubError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.contents
                .get(raw_url)
                .cloned()
                .ok_or_else(|| GitHubError::Status {
                    status: 404,
                    url: raw_url.to_string(),
                    message: "404: Not Found".to_string(),
                })
        }
    }

    /// Scripted generator
    struct FakeGenerator {
        configured: bool,
        fragments: Vec<Result<String, String>>,
        fail_to_start: Option<String>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeGenerator {
        fn answering(fragments: &[&str]) -> Self {
            Self {
                configured: true,
                fragments: fragments.iter().map(|f| Ok(f.to_string())).collect(),
                fail_to_start: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        fn model(&self) -> &str {
            "fake-model"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn stream_generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<FragmentStream, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(message) = &self.fail_to_start {
                return Err(GenerationError::Status {
                    status: 400,
                    message: message.clone(),
                });
            }
            let items: Vec<Result<String, GenerationError>> = self
                .fragments
                .iter()
                .map(|f| f.clone().map_err(GenerationError::Stream))
                .collect();
            Ok(stream::iter(items).boxed())
        }
    }

    async fn loaded(assistant: &Assistant<FakeSource, FakeGenerator>) -> Session {
        let outcome = assistant
            .load_repository(Session::new(), "https://github.com/acme/widgets", None)
            .await;
        assert!(!outcome.has_error(), "{:?}", outcome.effects);
        outcome.session
    }

    #[tokio::test]
    async fn test_invalid_url_leaves_session_untouched() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&[]));
        let outcome = assistant
            .load_repository(Session::new(), "ftp://example.com/x", None)
            .await;
        assert_eq!(outcome.effects, vec![Effect::Error("Invalid GitHub URL.".to_string())]);
        assert!(outcome.session.repository().is_none());
    }

    #[tokio::test]
    async fn test_load_repository() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&[]));
        let session = loaded(&assistant).await;
        assert_eq!(session.repository(), Some(&RepositoryRef::new("acme", "widgets")));
        assert_eq!(session.branch(), Some("main"));
        assert_eq!(session.files().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_branch_fails_without_default() {
        let source = FakeSource {
            branch: None,
            ..FakeSource::widgets()
        };
        let assistant = Assistant::new(source, FakeGenerator::answering(&[]));
        let outcome = assistant
            .load_repository(Session::new(), "https://github.com/acme/widgets", None)
            .await;
        assert!(outcome.has_error());
        assert!(outcome.effects[0].message().starts_with("Error fetching branch"));
        assert!(outcome.session.branch().is_none());
        assert!(outcome.session.repository().is_none());
    }

    #[tokio::test]
    async fn test_empty_tree_is_an_error() {
        let source = FakeSource {
            tree: Vec::new(),
            ..FakeSource::widgets()
        };
        let assistant = Assistant::new(source, FakeGenerator::answering(&[]));
        let outcome = assistant
            .load_repository(Session::new(), "https://github.com/acme/widgets", None)
            .await;
        assert!(outcome.effects[0].message().starts_with("Could not retrieve files"));
        assert!(outcome.session.files().is_empty());
    }

    #[tokio::test]
    async fn test_single_file_and_full_repository_are_exclusive() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&["ok"]));
        let session = loaded(&assistant).await;

        let outcome = assistant.select_file(session, "widgets/core.go").await;
        assert_eq!(outcome.effects, vec![Effect::Success("Loaded widgets/core.go".to_string())]);
        let outcome = assistant.ask(outcome.session, "what?", |_| {}).await;
        assert_eq!(outcome.session.transcript().len(), 2);

        let outcome = assistant.load_full_repository(outcome.session).await;
        let session = outcome.session;
        assert!(matches!(session.context(), Some(ActiveContext::Repository(_))));
        assert!(session.transcript().is_empty());

        let outcome = assistant.ask(session, "and now?", |_| {}).await;
        let outcome = assistant.select_file(outcome.session, "README.md").await;
        let session = outcome.session;
        match session.context() {
            Some(ActiveContext::SingleFile { file, page_url }) => {
                assert_eq!(file.path, "README.md");
                assert_eq!(file.extension, "md");
                assert_eq!(page_url, "https://github.com/acme/widgets/blob/main/README.md");
            }
            other => panic!("expected single file context, got {:?}", other),
        }
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_failed_select_keeps_previous_context() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&["ok"]));
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "README.md").await.session;
        let session = assistant.ask(session, "q", |_| {}).await.session;

        let outcome = assistant.select_file(session, "widgets/broken.bin").await;
        assert!(outcome.has_error());
        assert!(outcome.effects[0].message().starts_with("Failed to load file"));
        assert_eq!(outcome.session.transcript().len(), 2);
        assert!(matches!(
            outcome.session.context(),
            Some(ActiveContext::SingleFile { file, .. }) if file.path == "README.md"
        ));

        let outcome = assistant.select_file(outcome.session, "nope.rs").await;
        assert!(outcome.effects[0].message().contains("File not found"));
    }

    #[tokio::test]
    async fn test_full_load_records_placeholder_and_continues() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&[]));
        let session = loaded(&assistant).await;

        let outcome = assistant.load_full_repository(session).await;
        assert_eq!(assistant.source.fetches.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.effects.len(), 2);
        assert!(matches!(&outcome.effects[1], Effect::Warning(m) if m.contains("widgets/broken.bin")));

        let Some(ActiveContext::Repository(assembled)) = outcome.session.context() else {
            panic!("expected repository context");
        };
        assert_eq!(assembled.loaded, 3);
        assert_eq!(assembled.failed, vec!["widgets/broken.bin".to_string()]);
        assert!(assembled.text.contains("--- FILE: widgets/core.go (go) ---"));
        assert!(assembled.text.contains("--- FILE: docs/user guide.md (md) ---"));
        assert!(assembled.text.contains("--- FILE: widgets/broken.bin (fetch failed) ---"));
    }

    #[tokio::test]
    async fn test_end_to_end_single_file_question() {
        let generator = FakeGenerator::answering(&["This file ", "defines Spin."]);
        let assistant = Assistant::new(FakeSource::widgets(), generator);
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "widgets/core.go").await.session;

        let mut updates = Vec::new();
        let outcome = assistant
            .ask(session, "what does this file do?", |text| updates.push(text.to_string()))
            .await;

        assert!(outcome.effects.is_empty());
        let messages = outcome.session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "what does this file do?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "This file defines Spin.");

        assert_eq!(
            updates,
            vec![
                format!("This file {}", CURSOR),
                format!("This file defines Spin.{}", CURSOR),
                "This file defines Spin.".to_string(),
            ]
        );

        let requests = assistant.generator().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "what does this file do?");
        assert!(requests[0]
            .system_instruction
            .contains("https://github.com/acme/widgets/blob/main/widgets/core.go"));
        assert!(requests[0].system_instruction.contains("func Spin()"));
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_assistant_message() {
        let generator = FakeGenerator {
            fail_to_start: Some("API key not valid".to_string()),
            ..FakeGenerator::answering(&[])
        };
        let assistant = Assistant::new(FakeSource::widgets(), generator);
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "README.md").await.session;

        let outcome = assistant.ask(session, "hello?", |_| {}).await;
        assert!(outcome.has_error());
        let messages = outcome.session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.starts_with("Error occurred: "));
        assert!(messages[1].content.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_mid_stream_failure_is_committed() {
        let generator = FakeGenerator {
            fragments: vec![Ok("partial".to_string()), Err("connection reset".to_string())],
            ..FakeGenerator::answering(&[])
        };
        let assistant = Assistant::new(FakeSource::widgets(), generator);
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "README.md").await.session;

        let mut last = String::new();
        let outcome = assistant.ask(session, "q", |text| last = text.to_string()).await;
        let messages = outcome.session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("connection reset"));
        assert_eq!(last, messages[1].content);
    }

    #[tokio::test]
    async fn test_ask_requires_ready_session() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&["x"]));
        let outcome = assistant.ask(Session::new(), "q", |_| {}).await;
        assert_eq!(
            outcome.effects,
            vec![Effect::Warning(Readiness::NoRepository.hint().to_string())]
        );

        let session = loaded(&assistant).await;
        let outcome = assistant.ask(session, "q", |_| {}).await;
        assert_eq!(
            outcome.effects,
            vec![Effect::Warning(Readiness::NoContext.hint().to_string())]
        );
        assert!(outcome.session.transcript().is_empty());

        let outcome = assistant.ask(outcome.session, "   ", |_| {}).await;
        assert!(outcome.has_error());

        let unconfigured = FakeGenerator {
            configured: false,
            ..FakeGenerator::answering(&[])
        };
        let assistant = Assistant::new(FakeSource::widgets(), unconfigured);
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "README.md").await.session;
        let outcome = assistant.ask(session, "q", |_| {}).await;
        assert_eq!(
            outcome.effects,
            vec![Effect::Warning(Readiness::MissingApiKey.hint().to_string())]
        );
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let assistant = Assistant::new(FakeSource::widgets(), FakeGenerator::answering(&["a"]));
        let session = loaded(&assistant).await;
        let session = assistant.select_file(session, "README.md").await.session;
        let session = assistant.ask(session, "q", |_| {}).await.session;

        let outcome = assistant.clear(session);
        assert!(outcome.session.repository().is_none());
        assert!(outcome.session.files().is_empty());
        assert!(outcome.session.context().is_none());
        assert!(outcome.session.transcript().is_empty());
    }
}

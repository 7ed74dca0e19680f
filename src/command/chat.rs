//! Interactive chat loop.

use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::render::{
    format_context_preview, format_file_list, format_transcript, print_effects, StreamPrinter,
};
use crate::assistant::Assistant;
use crate::config::Config;
use crate::github::RepositorySource;
use crate::llm::TextGenerator;
use crate::session::Session;

const HELP: &str = "\
Commands:
  /load <url>           Load a repository, e.g. /load https://github.com/owner/name
  /token [pat]          Set the GitHub token for later loads (no argument clears it)
  /files                List the repository's files
  /select <path|#>      Use one file as context (by path or number from /files)
  /full                 Use the whole repository as context
  /show                 Show the active context
  /history              Show the conversation
  /clear                Reset repository state and chat history
  /help                 Show this help
  /quit                 Exit
Anything else is sent as a question.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Load(String),
    Token(Option<String>),
    Files,
    Select(String),
    Full,
    Show,
    History,
    Clear,
    Help,
    Quit,
    Ask(String),
    Usage(&'static str),
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    if !line.starts_with('/') {
        return ChatCommand::Ask(line.to_string());
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "/load" if arg.is_empty() => ChatCommand::Usage("/load <url>"),
        "/load" => ChatCommand::Load(arg.to_string()),
        "/token" if arg.is_empty() => ChatCommand::Token(None),
        "/token" => ChatCommand::Token(Some(arg.to_string())),
        "/files" => ChatCommand::Files,
        "/select" if arg.is_empty() => ChatCommand::Usage("/select <path|#>"),
        "/select" => ChatCommand::Select(arg.to_string()),
        "/full" => ChatCommand::Full,
        "/show" => ChatCommand::Show,
        "/history" => ChatCommand::History,
        "/clear" => ChatCommand::Clear,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        other => ChatCommand::Unknown(other.to_string()),
    }
}

/// Map a `/select` argument to a file path. Numbers refer to the 1-based
/// `/files` listing; anything else is taken as a path.
pub fn resolve_selection(session: &Session, arg: &str) -> String {
    if let Ok(n) = arg.parse::<usize>() {
        if let Some(entry) = n.checked_sub(1).and_then(|i| session.files().get(i)) {
            return entry.path.clone();
        }
    }
    arg.to_string()
}

pub async fn run_chat(config: Config) -> Result<()> {
    let assistant = config.build_assistant()?;
    let mut session = Session::new();
    let mut token = config.github_token.clone();

    println!("💬 RepoChat (model: {})", assistant.generator().model());
    print_status(&assistant, &session);
    println!("Type /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_command(&line) {
            ChatCommand::Quit => break,
            command => {
                session = execute(&assistant, session, &mut token, command).await;
            }
        }
    }

    println!("Bye!");
    Ok(())
}

async fn execute<S, G>(
    assistant: &Assistant<S, G>,
    session: Session,
    token: &mut Option<String>,
    command: ChatCommand,
) -> Session
where
    S: RepositorySource,
    G: TextGenerator,
{
    debug!(session = %session.id(), "Command: {:?}", redact(&command));

    match command {
        ChatCommand::Load(url) => {
            let outcome = assistant
                .load_repository(session, &url, token.as_deref())
                .await;
            print_effects(&outcome.effects);
            if !outcome.has_error() {
                print_status(assistant, &outcome.session);
            }
            outcome.session
        }
        ChatCommand::Token(value) => {
            match value {
                Some(_) => println!("🔑 GitHub token set for subsequent loads."),
                None => println!("🔑 GitHub token cleared."),
            }
            *token = value;
            session
        }
        ChatCommand::Files => {
            if session.files().is_empty() {
                println!("No files loaded. Use /load <url> first.");
            } else {
                println!("{}", format_file_list(session.files()));
            }
            session
        }
        ChatCommand::Select(arg) => {
            let path = resolve_selection(&session, &arg);
            let outcome = assistant.select_file(session, &path).await;
            print_effects(&outcome.effects);
            outcome.session
        }
        ChatCommand::Full => {
            println!("⏳ Fetching all files...");
            let outcome = assistant.load_full_repository(session).await;
            print_effects(&outcome.effects);
            outcome.session
        }
        ChatCommand::Show => {
            match session.context() {
                Some(context) => println!("{}", format_context_preview(context)),
                None => println!("No context loaded."),
            }
            session
        }
        ChatCommand::History => {
            println!("{}", format_transcript(session.transcript()));
            session
        }
        ChatCommand::Clear => {
            let outcome = assistant.clear(session);
            print_effects(&outcome.effects);
            outcome.session
        }
        ChatCommand::Help => {
            println!("{}", HELP);
            session
        }
        ChatCommand::Ask(question) => {
            let mut printer = StreamPrinter::new();
            let outcome = assistant
                .ask(session, &question, |text| printer.update(text))
                .await;
            printer.finish();
            // The answer (or error text) was already streamed; only
            // refusals need printing.
            if printer.is_empty() {
                print_effects(&outcome.effects);
            }
            outcome.session
        }
        ChatCommand::Usage(usage) => {
            println!("Usage: {}", usage);
            session
        }
        ChatCommand::Unknown(name) => {
            println!("Unknown command {}. Type /help for commands.", name);
            session
        }
        ChatCommand::Empty | ChatCommand::Quit => session,
    }
}

fn print_status<S, G>(assistant: &Assistant<S, G>, session: &Session)
where
    S: RepositorySource,
    G: TextGenerator,
{
    let readiness = session.readiness(assistant.generator().is_configured());
    if let Some(repo) = session.repository() {
        println!(
            "📦 {} @ {} ({} files)",
            repo,
            session.branch().unwrap_or_default(),
            session.files().len()
        );
    }
    println!("👉 {}", readiness.hint());
}

/// Keep tokens out of debug logs.
fn redact(command: &ChatCommand) -> ChatCommand {
    match command {
        ChatCommand::Token(Some(_)) => ChatCommand::Token(Some("[REDACTED]".to_string())),
        other => other.clone(),
    }
}

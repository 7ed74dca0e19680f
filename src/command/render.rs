//! Terminal rendering shared by the interactive and one-shot commands.

use std::io::{self, Write};

use crate::assistant::{Effect, CURSOR};
use crate::context::ActiveContext;
use crate::conversation::Conversation;
use crate::github::FileEntry;

/// Prefix for each kind of effect
fn marker(effect: &Effect) -> &'static str {
    match effect {
        Effect::Success(_) => "✅",
        Effect::Info(_) => "ℹ️ ",
        Effect::Warning(_) => "⚠️ ",
        Effect::Error(_) => "❌",
    }
}

pub fn format_effect(effect: &Effect) -> String {
    format!("{} {}", marker(effect), effect.message())
}

pub fn print_effects(effects: &[Effect]) {
    for effect in effects {
        if effect.is_error() {
            eprintln!("{}", format_effect(effect));
        } else {
            println!("{}", format_effect(effect));
        }
    }
}

/// Numbered file listing, 1-based so `/select 3` matches what was shown.
pub fn format_file_list(files: &[FileEntry]) -> String {
    let width = files.len().to_string().len();
    files
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{:>width$}. {}", i + 1, f.path, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preview of the active context.
pub fn format_context_preview(context: &ActiveContext) -> String {
    match context {
        ActiveContext::SingleFile { file, page_url } => {
            format!("{}\n{}", page_url, file.fenced())
        }
        ActiveContext::Repository(assembled) => {
            let mut text = format!(
                "Analyzing entire repository... ({} files, {} bytes)",
                assembled.loaded,
                assembled.text.len()
            );
            if !assembled.failed.is_empty() {
                text.push_str(&format!("\nNot fetched: {}", assembled.failed.join(", ")));
            }
            text
        }
    }
}

pub fn format_transcript(transcript: &Conversation) -> String {
    if transcript.is_empty() {
        return "No messages yet.".to_string();
    }
    transcript
        .messages()
        .iter()
        .map(|m| {
            format!(
                "[{}] {}: {}",
                m.created_at.format("%H:%M:%S"),
                m.role,
                m.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prints a streaming answer incrementally.
///
/// Each update carries the whole answer so far, possibly followed by the
/// cursor. Only the new suffix is written; an update that does not extend
/// what was printed (the error text replacing a partial answer) starts on a
/// fresh line.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: String,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text to write for this update, advancing the printed state.
    pub fn delta(&mut self, update: &str) -> String {
        let text = update.strip_suffix(CURSOR).unwrap_or(update);
        if let Some(rest) = text.strip_prefix(self.printed.as_str()) {
            let rest = rest.to_string();
            self.printed = text.to_string();
            rest
        } else {
            self.printed = text.to_string();
            format!("\n{}", text)
        }
    }

    pub fn update(&mut self, update: &str) {
        let delta = self.delta(update);
        if delta.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(delta.as_bytes());
        let _ = stdout.flush();
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.printed.is_empty()
    }

    /// End the answer line.
    pub fn finish(&mut self) {
        if !self.is_empty() {
            println!();
        }
    }
}

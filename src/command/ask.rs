use anyhow::{bail, Result};

use super::proceed;
use super::render::StreamPrinter;
use crate::config::Config;
use crate::session::Session;

/// Load a repository, pick the context, and stream one answer to stdout.
///
/// With `file` the question is about that file only; otherwise the whole
/// repository is fetched first.
pub async fn run_ask(config: Config, url: &str, file: Option<&str>, question: &str) -> Result<()> {
    let assistant = config.build_assistant()?;

    let outcome = assistant
        .load_repository(Session::new(), url, config.github_token.as_deref())
        .await;
    let session = proceed(outcome)?;

    let outcome = match file {
        Some(path) => assistant.select_file(session, path).await,
        None => {
            eprintln!("⏳ Fetching all files...");
            assistant.load_full_repository(session).await
        }
    };
    let session = proceed(outcome)?;

    let mut printer = StreamPrinter::new();
    let outcome = assistant
        .ask(session, question, |text| printer.update(text))
        .await;
    printer.finish();

    // A successful answer carries no effects; anything else is a refusal
    // or a failure.
    if let Some(effect) = outcome.effects.first() {
        bail!("{}", effect.message());
    }

    Ok(())
}

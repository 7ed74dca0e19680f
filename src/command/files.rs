use anyhow::Result;

use super::proceed;
use super::render::format_file_list;
use crate::config::Config;
use crate::session::Session;

pub async fn run_files(config: Config, url: &str) -> Result<()> {
    let assistant = config.build_assistant()?;

    let outcome = assistant
        .load_repository(Session::new(), url, config.github_token.as_deref())
        .await;
    let session = proceed(outcome)?;
    println!("{}", format_file_list(session.files()));

    Ok(())
}

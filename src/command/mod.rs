use anyhow::{bail, Result};

use crate::assistant::Outcome;
use crate::session::Session;

use render::format_effect;

mod ask;
mod chat;
mod files;
mod render;

pub use ask::run_ask;
pub use chat::run_chat;
pub use files::run_files;

/// Report progress on stderr and stop at the first error.
fn proceed(outcome: Outcome) -> Result<Session> {
    for effect in &outcome.effects {
        if effect.is_error() {
            bail!("{}", effect.message());
        }
        eprintln!("{}", format_effect(effect));
    }
    Ok(outcome.session)
}

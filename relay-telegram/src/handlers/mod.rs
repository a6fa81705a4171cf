//! Command handlers, in the order they sit in the chain.
//!
//! - [`LoggingHandler`] – logs every inbound message
//! - [`AccessGate`] – records the user, enforces bans and subscriptions
//! - [`StartHandler`] – `/start`, `/help`, `/status`, `/me`
//! - [`AdminHandler`] – sudo-only user management, stats and broadcast
//! - [`SettingsHandler`] – credentials, bots, course and channel lists, prompt answers
//! - [`ExtractionHandler`] – `/StartExtraction` course/channel selection and job start
//! - [`UnknownCommandHandler`] – answers commands nobody handled

mod access;
mod admin;
mod extraction;
mod logging;
mod settings;
mod start;

pub use access::AccessGate;
pub use admin::AdminHandler;
pub use extraction::ExtractionHandler;
pub use logging::LoggingHandler;
pub use settings::SettingsHandler;
pub use start::{StartHandler, UnknownCommandHandler};

use storage::SetupItem;

/// Reply listing what has to be configured before `/StartExtraction` works.
pub fn missing_text(missing: &[SetupItem]) -> String {
    let lines: Vec<String> = missing.iter().map(|m| format!("  • {}", m.hint())).collect();
    format!(
        "⚠️ Setup incomplete! Please configure these first:\n\n{}\n\nAfter setup, run /StartExtraction again.",
        lines.join("\n")
    )
}

/// Parses a 1-based list choice.
pub(crate) fn parse_choice(text: &str, len: usize) -> Option<usize> {
    let n: usize = text.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

pub(crate) fn numbered<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

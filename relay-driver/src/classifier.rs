//! Named message predicates used by the waits and the monitor loop.
//!
//! Every classifier only ever accepts messages sent *to* the driver identity; the driver's own
//! echoes (`outgoing == true`) are never a reply.

use relay_core::Message;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// A pure acceptance test over a message, with a name for logs and timeouts.
#[derive(Clone)]
pub struct Classifier {
    name: &'static str,
    predicate: Predicate,
}

impl Classifier {
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }

    /// Accepts messages whose text contains any of `words` (case-insensitive).
    pub fn keywords(name: &'static str, words: &'static [&'static str]) -> Self {
        Self::new(name, move |message| {
            message
                .text
                .as_deref()
                .is_some_and(|text| contains_any(text, words))
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accepts(&self, message: &Message) -> bool {
        !message.outgoing && (self.predicate)(message)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").field("name", &self.name).finish()
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

pub const TOKEN_PROMPT_WORDS: &[&str] = &["token", "send", "enter"];
pub const CHOICE_PROMPT_WORDS: &[&str] = &["choose", "select", "1.", "2.", "option", "type", "send"];
pub const LISTING_ERROR_WORDS: &[&str] = &["expired", "invalid", "wrong token", "error"];

pub const FILE_PROMPT_WORDS: &[&str] = &["file", "txt", "send", "bhejo", "upload"];
pub const START_INDEX_WORDS: &[&str] = &["start", "index", "begin", "kahan", "number", "1"];
pub const COURSE_NAME_WORDS: &[&str] = &["batch", "name", "course"];
pub const QUALITY_WORDS: &[&str] = &["resolution", "quality", "480", "720"];
pub const CREDIT_WORDS: &[&str] = &["credit", "watermark", "name", "@"];
pub const TOKEN_REQUEST_WORDS: &[&str] = &["token", "pw token", "access"];
pub const THUMBNAIL_WORDS: &[&str] = &["thumbnail", "thumb", "image", "poster", "url"];

pub const COMPLETION_WORDS: &[&str] = &[
    "all done",
    "done done",
    "everything done",
    "completed",
    "finish",
    "कर दिया",
    "ho gaya",
    "process complete",
    "extraction done",
    "done!",
];

/// First answer of the extractor bot: a menu with buttons or a reasonably long text.
pub fn start_menu() -> Classifier {
    Classifier::new("start menu", |m| {
        !m.buttons.is_empty() || m.text.as_deref().is_some_and(|t| t.chars().count() > 10)
    })
}

pub fn token_prompt() -> Classifier {
    Classifier::keywords("token prompt", TOKEN_PROMPT_WORDS)
}

/// Numbered course listing: a digit plus a `.` or a line break.
pub fn course_listing() -> Classifier {
    Classifier::new("course listing", |m| {
        m.text.as_deref().is_some_and(|t| {
            t.chars().any(|c| c.is_ascii_digit()) && (t.contains('.') || t.contains('\n'))
        })
    })
}

pub fn choice_prompt() -> Classifier {
    Classifier::keywords("choice prompt", CHOICE_PROMPT_WORDS)
}

/// A document whose file name ends with `extension` (case-sensitive).
pub fn file_with_extension(extension: &'static str) -> Classifier {
    Classifier::new("document", move |m| {
        m.document_name().is_some_and(|name| name.ends_with(extension))
    })
}

pub fn file_prompt() -> Classifier {
    Classifier::keywords("file prompt", FILE_PROMPT_WORDS)
}

pub fn start_index_prompt() -> Classifier {
    Classifier::keywords("start index prompt", START_INDEX_WORDS)
}

pub fn course_name_prompt() -> Classifier {
    Classifier::keywords("course name prompt", COURSE_NAME_WORDS)
}

pub fn quality_prompt() -> Classifier {
    Classifier::keywords("quality prompt", QUALITY_WORDS)
}

pub fn credit_prompt() -> Classifier {
    Classifier::keywords("credit prompt", CREDIT_WORDS)
}

pub fn token_request() -> Classifier {
    Classifier::keywords("token request", TOKEN_REQUEST_WORDS)
}

pub fn thumbnail_prompt() -> Classifier {
    Classifier::keywords("thumbnail prompt", THUMBNAIL_WORDS)
}

/// True when a course listing is really an error about the access token.
pub fn listing_reports_error(text: &str) -> bool {
    contains_any(text, LISTING_ERROR_WORDS)
}

/// True when the uploader bot says it has finished.
pub fn is_completion(text: &str) -> bool {
    contains_any(text, COMPLETION_WORDS)
}

/// Document with a `.pdf` file name, any case.
pub fn is_pdf_document(message: &Message) -> bool {
    message
        .document_name()
        .is_some_and(|name| name.to_lowercase().ends_with(".pdf"))
}

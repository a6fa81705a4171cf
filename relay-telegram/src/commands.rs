//! Slash-command parsing for operator messages.

/// A `/name@bot args` message, name lower-cased so matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: String,
    pub args: &'a str,
}

impl<'a> Command<'a> {
    /// Returns `None` for plain text.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let (head, args) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], rest[pos..].trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_lowercase(),
            args,
        })
    }

    /// Whitespace-separated arguments.
    pub fn arg_list(&self) -> Vec<&'a str> {
        self.args.split_whitespace().collect()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Every command some handler answers. Anything else starting with `/` may still be
/// consumed as a reply to a pending prompt (e.g. an uploader command like `/Mahi`).
pub const KNOWN_COMMANDS: &[&str] = &[
    "start",
    "help",
    "status",
    "me",
    "settoken",
    "setextractor",
    "setuploader",
    "setupcommand",
    "setupcredit",
    "addbatch",
    "delbatch",
    "batches",
    "addchannel",
    "delchannel",
    "channels",
    "cancel",
    "startextraction",
    "adduser",
    "removeuser",
    "banuser",
    "unbanuser",
    "stats",
    "broadcast",
];

/// Commands available without a subscription.
pub const OPEN_COMMANDS: &[&str] = &["start", "help", "me"];

/// Parses `text` and returns the command only when a handler knows it.
pub fn known_command(text: &str) -> Option<Command<'_>> {
    Command::parse(text).filter(|c| KNOWN_COMMANDS.contains(&c.name.as_str()))
}

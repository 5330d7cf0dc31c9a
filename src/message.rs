//! Text protocol definitions
//!
//! Every frame in both directions is plain text. Inbound text is classified
//! into an [`Input`]; outbound notices are built by the formatting helpers
//! so the wire format lives in one place.

/// Reserved display name of the chatbot participant
pub const CHATBOT_NAME: &str = "Chatbot";

/// Case-insensitive prefix that directs a room message at the chatbot
pub const BOT_PREFIX: &str = "@bot ";

/// Case-insensitive command that returns a connection to the root shell
pub const QUIT_COMMAND: &str = "quit";

/// Classified inbound text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// Empty or whitespace only
    Blank,
    /// Return to the root shell
    Quit,
    /// Message addressed to the chatbot, prefix stripped
    Bot(&'a str),
    /// Ordinary chat line
    Chat(&'a str),
}

impl<'a> Input<'a> {
    /// Classify a raw inbound text frame
    pub fn classify(text: &'a str) -> Self {
        if text.trim().is_empty() {
            return Input::Blank;
        }
        if text.eq_ignore_ascii_case(QUIT_COMMAND) {
            return Input::Quit;
        }
        match text.get(..BOT_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(BOT_PREFIX) => {
                Input::Bot(&text[BOT_PREFIX.len()..])
            }
            _ => Input::Chat(text),
        }
    }
}

/// `# <name> has joined the chat room.`
pub fn joined_notice(name: &str) -> String {
    format!("# {} has joined the chat room.", name)
}

/// `# <name> left the chat room.`
pub fn left_notice(name: &str) -> String {
    format!("# {} left the chat room.", name)
}

/// `# <old> has changed name to "<new>"`
pub fn renamed_notice(old: &str, new: &str) -> String {
    format!("# {} has changed name to \"{}\"", old, new)
}

/// `> <name>: <text>`
pub fn chat_line(name: &str, text: &str) -> String {
    format!("> {}: {}", name, text)
}

/// Private welcome sent to a participant after joining
pub fn welcome(name: &str) -> String {
    format!(
        "# Welcome to the chat room! Your name is \"{}\". \
         Start a message with \"@bot\" to ask the chatbot, or type \"quit\" to leave.",
        name
    )
}

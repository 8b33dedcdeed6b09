pub mod telegram;

use async_trait::async_trait;
use teloxide::types::{ChatId, ParseMode, ThreadId};
use teloxide::RequestError;

/// A command message received from the platform
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    /// Forum topic the message was posted in, if any
    pub thread_id: Option<ThreadId>,
    /// Display name of the sender
    pub sender_display_name: String,
    /// Full message text, command included
    pub raw_text: String,
}

impl InboundEvent {
    /// Text following the first `offset` characters of the raw command,
    /// minus the single space separating it from the keyword. A command
    /// token carrying `@botname` is skipped whole instead.
    /// Shorter input yields an empty string.
    pub fn argument_after(&self, offset: usize) -> String {
        let text = self.raw_text.as_str();
        let command_end = text.find(char::is_whitespace).unwrap_or(text.len());
        let rest: String = if text[..command_end].contains('@') {
            text[command_end..].to_string()
        } else {
            text.chars().skip(offset).collect()
        };
        match rest.strip_prefix(' ') {
            Some(stripped) => stripped.to_string(),
            None => rest,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

impl OutboundMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
        }
    }

    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: Some(ParseMode::MarkdownV2),
        }
    }
}

/// Outbound calls the command handlers are allowed to make
#[async_trait]
pub trait ForumClient: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), RequestError>;

    async fn create_topic(&self, group: ChatId, name: &str) -> Result<(), RequestError>;

    async fn rename_topic(
        &self,
        group: ChatId,
        thread: ThreadId,
        name: &str,
    ) -> Result<(), RequestError>;

    async fn delete_topic(&self, group: ChatId, thread: ThreadId) -> Result<(), RequestError>;
}

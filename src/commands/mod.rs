pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::BotCommand;
use teloxide::utils::command::parse_command;
use teloxide::RequestError;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::BotError;
use crate::platform::{ForumClient, InboundEvent};

/// Everything a handler may touch while serving one command
#[derive(Clone)]
pub struct HandlerContext {
    pub client: Arc<dyn ForumClient>,
    pub config: Arc<Config>,
}

/// A procedure bound to one command keyword.
///
/// Failures of the handler's own outbound call are dealt with inside
/// `handle`; only a failed fallback send is returned to the caller.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Name used in error reports, e.g. `add_handler`
    fn name(&self) -> &'static str;

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError>;
}

struct RegistryEntry {
    description: String,
    handler: Arc<dyn CommandHandler>,
}

/// Keyword to handler table, built once at startup
#[derive(Default)]
pub struct CommandRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the six commands the bot serves.
    pub fn with_default_commands() -> Result<Self, BotError> {
        use handlers::*;

        let commands: [(&str, &str, Arc<dyn CommandHandler>); 6] = [
            ("start", "show the welcome message", Arc::new(StartHandler)),
            ("add", "create a project topic: /add <name>", Arc::new(AddHandler)),
            ("edit", "rename the project topic: /edit <name>", Arc::new(EditHandler)),
            ("delete", "delete the project topic", Arc::new(DeleteHandler)),
            ("emails", "list team email addresses", Arc::new(EmailsHandler)),
            ("id", "print chat and thread ids to the bot console", Arc::new(IdHandler)),
        ];

        let mut registry = Self::new();
        for (keyword, description, handler) in commands {
            registry.register(keyword, description, handler)?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        keyword: &str,
        description: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), BotError> {
        if self.entries.contains_key(keyword) {
            return Err(BotError::Configuration(format!(
                "command /{keyword} is already registered"
            )));
        }
        info!("Registered command: /{} -> {}", keyword, handler.name());
        self.entries.insert(
            keyword.to_string(),
            RegistryEntry {
                description: description.to_string(),
                handler,
            },
        );
        Ok(())
    }

    /// Run the handler registered for `keyword`. Unknown keywords are ignored.
    pub async fn dispatch(
        &self,
        keyword: &str,
        ctx: &HandlerContext,
        event: &InboundEvent,
    ) -> Result<(), RequestError> {
        let Some(entry) = self.entries.get(keyword) else {
            debug!("Ignoring unregistered command: /{}", keyword);
            return Ok(());
        };
        entry.handler.handle(ctx, event).await
    }

    /// Parse the command out of `event` and dispatch it. Commands addressed
    /// to another bot and plain text are ignored.
    pub async fn dispatch_event(
        &self,
        bot_username: &str,
        ctx: &HandlerContext,
        event: &InboundEvent,
    ) -> Result<(), RequestError> {
        let Some(keyword) = parse_keyword(&event.raw_text, bot_username) else {
            return Ok(());
        };

        info!(
            "Command /{} from {} in chat {}",
            keyword, event.sender_display_name, event.chat_id.0
        );

        self.dispatch(&keyword, ctx, event).await
    }

    /// Registered commands in keyword order, for the Telegram command menu
    pub fn bot_commands(&self) -> Vec<BotCommand> {
        let mut commands: Vec<BotCommand> = self
            .entries
            .iter()
            .map(|(keyword, entry)| BotCommand::new(keyword, &entry.description))
            .collect();
        commands.sort_by(|a, b| a.command.cmp(&b.command));
        commands
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Lowercased command keyword of `text`: `/Add@topic_bot name` -> `add`.
/// `None` for plain text and for commands addressed to another bot.
pub fn parse_keyword(text: &str, bot_username: &str) -> Option<String> {
    if !text.starts_with('/') {
        return None;
    }
    let (command, _) = parse_command(text, bot_username)?;
    if command.is_empty() {
        return None;
    }
    Some(command.to_lowercase())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use teloxide::types::{ChatId, ThreadId};
    use teloxide::ApiError;

    use crate::platform::OutboundMessage;

    pub const BOT_USERNAME: &str = "topic_bot";

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Send(OutboundMessage),
        Create { group: ChatId, name: String },
        Rename { group: ChatId, thread: ThreadId, name: String },
        Delete { group: ChatId, thread: ThreadId },
    }

    /// Records every outbound call; optionally fails topic calls or sends.
    #[derive(Default)]
    pub struct RecordingClient {
        pub calls: Mutex<Vec<Call>>,
        pub fail_topics: bool,
        pub fail_sends: bool,
    }

    impl RecordingClient {
        pub fn failing_topics() -> Self {
            Self {
                fail_topics: true,
                ..Self::default()
            }
        }

        pub fn failing_everything() -> Self {
            Self {
                fail_topics: true,
                fail_sends: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call, fail: bool) -> Result<(), RequestError> {
            self.calls.lock().unwrap().push(call);
            if fail {
                Err(RequestError::Api(ApiError::Unknown(
                    "Bad Request: not enough rights".to_string(),
                )))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ForumClient for RecordingClient {
        async fn send(&self, message: OutboundMessage) -> Result<(), RequestError> {
            self.record(Call::Send(message), self.fail_sends)
        }

        async fn create_topic(&self, group: ChatId, name: &str) -> Result<(), RequestError> {
            let call = Call::Create {
                group,
                name: name.to_string(),
            };
            self.record(call, self.fail_topics)
        }

        async fn rename_topic(
            &self,
            group: ChatId,
            thread: ThreadId,
            name: &str,
        ) -> Result<(), RequestError> {
            let call = Call::Rename {
                group,
                thread,
                name: name.to_string(),
            };
            self.record(call, self.fail_topics)
        }

        async fn delete_topic(&self, group: ChatId, thread: ThreadId) -> Result<(), RequestError> {
            self.record(Call::Delete { group, thread }, self.fail_topics)
        }
    }

    pub fn config() -> Config {
        Config::from_toml_str(
            r#"
            emails = ["alice@example.com", "bob@example.com"]

            [telegram]
            bot_token = "123:ABC"
            group_id = -1009
            "#,
        )
        .unwrap()
    }

    pub fn context(client: Arc<RecordingClient>) -> HandlerContext {
        HandlerContext {
            client,
            config: Arc::new(config()),
        }
    }

    pub fn event(text: &str) -> InboundEvent {
        InboundEvent {
            chat_id: ChatId(42),
            thread_id: None,
            sender_display_name: "Ann".to_string(),
            raw_text: text.to_string(),
        }
    }
}

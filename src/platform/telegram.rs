use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ThreadId};
use teloxide::RequestError;
use tracing::{info, warn};

use crate::commands::{CommandRegistry, HandlerContext};
use crate::config::Config;
use crate::error::BotError;
use crate::platform::{ForumClient, InboundEvent, OutboundMessage};

#[async_trait]
impl ForumClient for Bot {
    async fn send(&self, message: OutboundMessage) -> Result<(), RequestError> {
        let mut request = self.send_message(message.chat_id, message.text);
        if let Some(mode) = message.parse_mode {
            request = request.parse_mode(mode);
        }
        request.await?;
        Ok(())
    }

    async fn create_topic(&self, group: ChatId, name: &str) -> Result<(), RequestError> {
        self.create_forum_topic(group, name.to_string()).await?;
        Ok(())
    }

    async fn rename_topic(
        &self,
        group: ChatId,
        thread: ThreadId,
        name: &str,
    ) -> Result<(), RequestError> {
        self.edit_forum_topic(group, thread)
            .name(name.to_string())
            .await?;
        Ok(())
    }

    async fn delete_topic(&self, group: ChatId, thread: ThreadId) -> Result<(), RequestError> {
        self.delete_forum_topic(group, thread).await?;
        Ok(())
    }
}

/// Build an inbound event from a Telegram message. Messages without text are skipped.
pub fn inbound_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    let sender_display_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_default();

    Some(InboundEvent {
        chat_id: msg.chat.id,
        thread_id: msg.thread_id,
        sender_display_name,
        raw_text: text.to_string(),
    })
}

/// Shared state handed to every update
pub struct BotState {
    registry: CommandRegistry,
    ctx: HandlerContext,
    /// Commands addressed to any other `@username` are ignored
    bot_username: String,
}

/// Run the Telegram bot until Ctrl-C
pub async fn run(config: Arc<Config>, registry: CommandRegistry) -> Result<()> {
    let bot = Bot::new(&config.telegram.bot_token);

    info!("Starting Telegram bot...");

    let me = bot
        .get_me()
        .await
        .context("Failed to fetch bot account info")?;
    let bot_username = me
        .user
        .username
        .clone()
        .context("Bot account has no username")?;
    info!("Running as @{}", bot_username);

    if let Err(e) = bot.set_my_commands(registry.bot_commands()).await {
        warn!("Failed to publish command menu: {}", e);
    }

    let state = Arc::new(BotState {
        registry,
        ctx: HandlerContext {
            client: Arc::new(bot.clone()),
            config,
        },
        bot_username,
    });

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> Result<(), BotError> {
    let Some(event) = inbound_event(&msg) else {
        return Ok(());
    };

    state
        .registry
        .dispatch_event(&state.bot_username, &state.ctx, &event)
        .await?;
    Ok(())
}

use async_trait::async_trait;
use teloxide::utils::markdown;
use teloxide::RequestError;
use tracing::{error, info};

use super::{CommandHandler, HandlerContext};
use crate::error::format_error;
use crate::platform::{InboundEvent, OutboundMessage};

pub const ADD_APOLOGY: &str = "Sorry, can't add project at the moment!";
/// Shared by /edit and /delete
pub const EDIT_APOLOGY: &str = "Sorry, can't edit project at the moment!";
pub const EMAILS_APOLOGY: &str = "Sorry, can't get emails at the moment!";

/// Length of `/add` in characters
const ADD_PREFIX_LEN: usize = 4;
/// Length of `/edit` in characters
const EDIT_PREFIX_LEN: usize = 5;

/// MarkdownV2 greeting; the sender name is escaped, template literals are pre-escaped.
pub fn welcome_message(username: &str) -> String {
    format!(
        "Welcome *{}* \n1\\. Use /add to add project",
        markdown::escape(username)
    )
}

/// Log a failed primary call and answer the user with `apology` instead.
/// A failed apology is returned to the dispatcher.
async fn apologize_on_failure(
    ctx: &HandlerContext,
    event: &InboundEvent,
    handler_name: &str,
    apology: &str,
    outcome: Result<(), RequestError>,
) -> Result<(), RequestError> {
    if let Err(e) = outcome {
        error!("{}", format_error(&e, handler_name));
        ctx.client
            .send(OutboundMessage::plain(event.chat_id, apology))
            .await?;
    }
    Ok(())
}

pub struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    fn name(&self) -> &'static str {
        "start_handler"
    }

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError> {
        let text = welcome_message(&event.sender_display_name);
        if let Err(e) = ctx
            .client
            .send(OutboundMessage::markdown(event.chat_id, text))
            .await
        {
            error!("{}", format_error(&e, self.name()));
        }
        Ok(())
    }
}

pub struct AddHandler;

#[async_trait]
impl CommandHandler for AddHandler {
    fn name(&self) -> &'static str {
        "add_handler"
    }

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError> {
        let topic_name = event.argument_after(ADD_PREFIX_LEN);
        info!("Creating topic '{}' in group {}", topic_name, ctx.config.group().0);

        let outcome = ctx
            .client
            .create_topic(ctx.config.group(), &topic_name)
            .await;
        apologize_on_failure(ctx, event, self.name(), ADD_APOLOGY, outcome).await
    }
}

pub struct EditHandler;

#[async_trait]
impl CommandHandler for EditHandler {
    fn name(&self) -> &'static str {
        "edit_handler"
    }

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError> {
        let new_name = event.argument_after(EDIT_PREFIX_LEN);
        let thread = ctx.config.managed_thread();
        info!("Renaming topic {} to '{}'", thread.0 .0, new_name);

        let outcome = ctx
            .client
            .rename_topic(ctx.config.group(), thread, &new_name)
            .await;
        apologize_on_failure(ctx, event, self.name(), EDIT_APOLOGY, outcome).await
    }
}

pub struct DeleteHandler;

#[async_trait]
impl CommandHandler for DeleteHandler {
    fn name(&self) -> &'static str {
        "delete_handler"
    }

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError> {
        let thread = ctx.config.managed_thread();
        info!("Deleting topic {}", thread.0 .0);

        let outcome = ctx.client.delete_topic(ctx.config.group(), thread).await;
        apologize_on_failure(ctx, event, self.name(), EDIT_APOLOGY, outcome).await
    }
}

pub struct EmailsHandler;

#[async_trait]
impl CommandHandler for EmailsHandler {
    fn name(&self) -> &'static str {
        "emails_handler"
    }

    async fn handle(&self, ctx: &HandlerContext, event: &InboundEvent) -> Result<(), RequestError> {
        let message = OutboundMessage::plain(event.chat_id, ctx.config.email_list_text());
        let outcome = ctx.client.send(message).await;
        apologize_on_failure(ctx, event, self.name(), EMAILS_APOLOGY, outcome).await
    }
}

/// Prints where the command was sent from; makes no outbound call.
pub struct IdHandler;

impl IdHandler {
    fn console_lines(event: &InboundEvent) -> Vec<String> {
        let mut lines = vec![format!("chat_id {}", event.chat_id.0)];
        if let Some(thread) = event.thread_id {
            lines.push(format!("thread_id {}", thread.0 .0));
        }
        lines
    }
}

#[async_trait]
impl CommandHandler for IdHandler {
    fn name(&self) -> &'static str {
        "id_handler"
    }

    async fn handle(
        &self,
        _ctx: &HandlerContext,
        event: &InboundEvent,
    ) -> Result<(), RequestError> {
        for line in Self::console_lines(event) {
            println!("{line}");
        }
        Ok(())
    }
}

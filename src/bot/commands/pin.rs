//! The `pin` message context-menu command.
//!
//! Adapts the poise context to [`PinSurface`] and hands the target message to
//! [`crate::core::pin::handle_pin`].

use crate::bot::Context;
use crate::core::pin::{PinSurface, PinnedMessage};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

/// Converts the resolved Discord message into the recorded shape.
///
/// The creation time comes from the message id's snowflake.
pub fn pinned_from_discord(msg: &serenity::Message) -> Result<PinnedMessage> {
    let created = msg.id.created_at();
    let created_at = DateTime::<Utc>::from_timestamp(created.unix_timestamp(), 0).ok_or_else(|| {
        Error::InvalidMessage {
            message: format!("message {} has an out-of-range timestamp", msg.id),
        }
    })?;

    Ok(PinnedMessage {
        message_id: msg.id.to_string(),
        author_id: msg.author.id.to_string(),
        author_name: msg.author.name.clone(),
        content: msg.content.clone(),
        attachment_urls: msg.attachments.iter().map(|a| a.url.clone()).collect(),
        created_at,
    })
}

/// Sends pin output through a live interaction. Mentions are never resolved,
/// so mirroring a message that says `@everyone` pings nobody.
struct InteractionSurface<'a> {
    ctx: Context<'a>,
    log_channel: serenity::ChannelId,
}

#[async_trait]
impl PinSurface for InteractionSurface<'_> {
    async fn send_log(&self, content: &str) -> Result<()> {
        let message = serenity::CreateMessage::new()
            .content(content)
            .allowed_mentions(serenity::CreateAllowedMentions::new());
        self.log_channel
            .send_message(self.ctx.http(), message)
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, content: &str) -> Result<()> {
        self.ctx
            .send(
                poise::CreateReply::default()
                    .content(content)
                    .allowed_mentions(serenity::CreateAllowedMentions::new()),
            )
            .await?;
        Ok(())
    }
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{InteractionSurface, pinned_from_discord};
    use crate::bot::Context;
    use crate::core::pin::handle_pin;
    use crate::errors::Result;
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Records the selected message in D1 and mirrors it to the log channel.
    #[poise::command(context_menu_command = "pin")]
    pub async fn pin(ctx: Context<'_>, msg: serenity::Message) -> Result<()> {
        info!(
            "Pin requested by {} ({}) for message {}",
            ctx.author().name,
            ctx.author().id,
            msg.id
        );
        // The D1 round trip can outlast Discord's three second response window.
        ctx.defer().await?;

        let data = ctx.data();
        let message = pinned_from_discord(&msg)?;
        let surface = InteractionSurface {
            ctx,
            log_channel: data.config.discord.log_channel_id,
        };
        handle_pin(data.api.as_ref(), &surface, &data.database_id, &message).await
    }
}

// Re-export all commands
pub use inner::*;

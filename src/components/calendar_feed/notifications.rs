use crate::error::{delivery_error, BotResult};
use async_trait::async_trait;
use poise::serenity_prelude::{self as serenity, ChannelId, CreateMessage};
use std::sync::Arc;
use tracing::{debug, error};

/// Outbound side of the chat platform
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver markdown `text` to the chat identified by `chat_id`
    async fn send(&self, chat_id: &str, text: &str) -> BotResult<()>;
}

/// Sends messages to Discord channels
pub struct DiscordSink {
    http: Arc<serenity::Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageSink for DiscordSink {
    async fn send(&self, chat_id: &str, text: &str) -> BotResult<()> {
        let id = chat_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| delivery_error(&format!("Invalid channel id: {}", chat_id)))?;

        ChannelId::new(id)
            .send_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(|e| delivery_error(&format!("Failed to send message: {}", e)))?;
        Ok(())
    }
}

/// Outcome of delivering one message to a set of recipients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Send every chunk to every recipient.
///
/// A failing recipient is logged and skipped; the rest of the batch still
/// gets the message.
pub async fn broadcast(
    sink: &dyn MessageSink,
    recipients: &[String],
    chunks: &[String],
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    if chunks.is_empty() {
        return report;
    }

    for recipient in recipients {
        debug!("Sending {} message part(s) to {}", chunks.len(), recipient);
        let mut result = Ok(());
        for chunk in chunks {
            result = sink.send(recipient, chunk).await;
            if result.is_err() {
                break;
            }
        }

        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!("Was unable to send message to {}: {}", recipient, e);
                report.failed += 1;
            }
        }
    }

    report
}

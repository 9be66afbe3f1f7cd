use crate::components::calendar_feed::format::{split_message, MESSAGE_LIMIT};
use crate::components::{CalendarHandle, SharedSubscribers};
use crate::config::Config;
use crate::error::BotResult;
use poise::serenity_prelude::{self as serenity, CreateEmbed};
use std::sync::Arc;

// Export submodules
pub mod calendar;
pub mod subscription;
pub mod util;

/// Shared context for all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Arc<Config>,
    pub calendar: CalendarHandle,
    pub subscribers: SharedSubscribers,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<Config>, calendar: CalendarHandle, subscribers: SharedSubscribers) -> Self {
        Self {
            config,
            calendar,
            subscribers,
        }
    }

    /// Locale used for replies
    pub fn locale(&self) -> &str {
        &self.config.bot_locale
    }
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, crate::error::Error>;

/// All application commands and event listeners
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, crate::error::Error>> {
    vec![
        // Calendar commands
        calendar::events(),
        // Subscription commands
        subscription::notify(),
        subscription::subscribe(),
        subscription::unsubscribe(),
        subscription::remind(),
        // Utility commands
        util::status(),
        util::help(),
    ]
}

/// Chat identifier of the channel a command was issued in
pub fn chat_id(ctx: &Context<'_>) -> String {
    ctx.channel_id().get().to_string()
}

/// Reply with `text`, split into as many messages as the length limit requires
pub async fn say_chunked(ctx: Context<'_>, text: &str) -> CommandResult {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Embed for successful command output
pub fn create_success_embed(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(serenity::Colour::DARK_GREEN)
}

/// Embed for errors shown to the user
pub fn create_error_embed(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(serenity::Colour::RED)
}

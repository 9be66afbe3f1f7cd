use crate::commands::{chat_id, CommandResult, Context};
use crate::components::Category;

const ENABLE_WORDS: &[&str] = &["on", "an", "ein", "yes", "ja", "true", "1"];
const DISABLE_WORDS: &[&str] = &["off", "aus", "no", "nein", "false", "0"];

/// Interpret an on/off argument, in English or German
pub fn parse_toggle(value: &str) -> Option<bool> {
    let value = value.trim().to_lowercase();
    if ENABLE_WORDS.contains(&value.as_str()) {
        Some(true)
    } else if DISABLE_WORDS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Turn notifications about new events on or off for this channel
#[poise::command(slash_command, prefix_command)]
pub async fn notify(
    ctx: Context<'_>,
    #[description = "on or off"] state: Option<String>,
) -> CommandResult {
    toggle(ctx, "notify", Category::NewEvents, state).await
}

/// Turn reminders before events on or off for this channel
#[poise::command(slash_command, prefix_command)]
pub async fn remind(
    ctx: Context<'_>,
    #[description = "on or off"] state: Option<String>,
) -> CommandResult {
    toggle(ctx, "remind", Category::Reminders, state).await
}

/// Receive notifications about new events in this channel
#[poise::command(slash_command, prefix_command, aliases("abo"))]
pub async fn subscribe(ctx: Context<'_>) -> CommandResult {
    set_subscription(ctx, Category::NewEvents, true).await
}

/// Stop notifications about new events in this channel
#[poise::command(slash_command, prefix_command, aliases("deabo"))]
pub async fn unsubscribe(ctx: Context<'_>) -> CommandResult {
    set_subscription(ctx, Category::NewEvents, false).await
}

async fn toggle(
    ctx: Context<'_>,
    command: &str,
    category: Category,
    state: Option<String>,
) -> CommandResult {
    match state.as_deref().and_then(parse_toggle) {
        Some(enable) => set_subscription(ctx, category, enable).await,
        None => {
            let locale = ctx.data().locale();
            let prefix = &ctx.data().config.command_prefix;
            ctx.say(t!(
                "toggle_usage",
                locale = locale,
                prefix = prefix,
                command = command
            ))
            .await?;
            Ok(())
        }
    }
}

async fn set_subscription(ctx: Context<'_>, category: Category, enable: bool) -> CommandResult {
    let id = chat_id(&ctx);
    let locale = ctx.data().locale();

    let changed = {
        let store = ctx.data().subscribers.lock().await;
        if enable {
            store.add(&id, category).await?
        } else {
            store.remove(&id, category).await?
        }
    };

    let key = match (enable, changed) {
        (true, true) => "subscribe_success",
        (true, false) => "subscribe_already",
        (false, true) => "unsubscribe_success",
        (false, false) => "unsubscribe_not_subscribed",
    };
    let category_name = t!(category.label_key(), locale = locale);
    ctx.say(t!(key, locale = locale, category = category_name)).await?;
    Ok(())
}

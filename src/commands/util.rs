use crate::commands::{chat_id, create_success_embed, CommandResult, Context};
use crate::components::Category;

/// Show this channel's subscriptions and the calendar sync state
#[poise::command(slash_command, prefix_command)]
pub async fn status(ctx: Context<'_>) -> CommandResult {
    let data = ctx.data();
    let locale = data.locale();
    let id = chat_id(&ctx);

    let mut lines = Vec::new();
    {
        let store = data.subscribers.lock().await;
        for category in Category::ALL {
            let state = if store.contains(&id, category).await? {
                t!("status_subscribed", locale = locale)
            } else {
                t!("status_not_subscribed", locale = locale)
            };
            let key = match category {
                Category::NewEvents => "status_new_events",
                Category::Reminders => "status_reminders",
            };
            lines.push(t!(key, locale = locale, state = state).to_string());
        }
    }

    let feed = data.calendar.status().await?;
    lines.push(match feed.last_sync {
        Some(time) => {
            let tz = data.config.tz()?;
            let time = time
                .with_timezone(&tz)
                .format(&t!("format_datetime", locale = locale))
                .to_string();
            t!("status_last_sync", locale = locale, time = time).to_string()
        }
        None => t!("status_never_synced", locale = locale).to_string(),
    });
    lines.push(t!("status_events", locale = locale, count = feed.committed_events).to_string());

    let interval = data.config.check_interval;
    let offset = data.config.reminder_offset_minutes;
    let timezone = &data.config.timezone;
    lines.push(
        t!(
            "status_schedule",
            locale = locale,
            interval = interval,
            offset = offset,
            timezone = timezone
        )
        .to_string(),
    );

    if let Some(error) = &feed.last_error {
        lines.push(t!("status_last_error", locale = locale, error = error).to_string());
    }

    ctx.send(poise::CreateReply::default().embed(create_success_embed(
        &t!("status_title", locale = locale),
        &lines.join("\n"),
    )))
    .await?;
    Ok(())
}

/// Show the available commands
#[poise::command(slash_command, prefix_command, aliases("hilfe", "start"))]
pub async fn help(ctx: Context<'_>) -> CommandResult {
    let locale = ctx.data().locale();
    let prefix = &ctx.data().config.command_prefix;
    let offset = ctx.data().config.reminder_offset_minutes;

    let lines = [
        t!("help_events", locale = locale, prefix = prefix),
        t!("help_notify", locale = locale, prefix = prefix),
        t!("help_subscribe", locale = locale, prefix = prefix),
        t!("help_remind", locale = locale, prefix = prefix, offset = offset),
        t!("help_status", locale = locale, prefix = prefix),
        t!("help_help", locale = locale, prefix = prefix),
    ];

    ctx.send(poise::CreateReply::default().embed(create_success_embed(
        &t!("help_title", locale = locale),
        &lines.join("\n"),
    )))
    .await?;
    Ok(())
}

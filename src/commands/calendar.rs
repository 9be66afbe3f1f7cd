use crate::commands::{create_error_embed, say_chunked, CommandResult, Context};
use crate::components::calendar_feed::format::event_list_message;
use tracing::error;

/// List all upcoming events of the calendar
#[poise::command(slash_command, prefix_command, aliases("termine"))]
pub async fn events(ctx: Context<'_>) -> CommandResult {
    ctx.defer().await?;
    let locale = ctx.data().locale();

    let events = match ctx.data().calendar.list_events().await {
        Ok(events) => events,
        Err(e) => {
            error!("Could not list calendar events: {}", e);
            ctx.send(
                poise::CreateReply::default()
                    .embed(create_error_embed(
                        &t!("error_title", locale = locale, context = "events"),
                        &t!("calendar_error_fetching", locale = locale, error = e.to_string()),
                    ))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    };

    say_chunked(ctx, &event_list_message(&events, locale)).await
}

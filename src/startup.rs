use crate::commands::{create_error_embed, get_all_application_commands, CommandContext};
use crate::components::calendar_feed::CalendarFeed;
use crate::components::{CalendarHandle, ComponentManager, SubscriberStore};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use poise::serenity_prelude::{self as serenity, CreateMessage};
use rust_i18n::t;
use serenity::model::user::OnlineStatus;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serenity=warn,poise=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and start the Discord bot
pub async fn start_bot(config: Arc<Config>) -> miette::Result<()> {
    let token = config.discord_token.clone();
    let activity = config.activity.clone();

    // Set locale from config
    crate::utils::i18n::set_locale(&config.bot_locale);

    // Set up framework options
    let options = poise::FrameworkOptions {
        commands: get_all_application_commands(),
        on_error: |error| Box::pin(on_error(error)),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.command_prefix.clone()),
            case_insensitive_commands: true,
            ..Default::default()
        },
        ..Default::default()
    };

    // Prefix commands need the message content
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    // Shared state for the scheduler and the command handlers
    let subscribers = SubscriberStore::from_files(&config.files).shared();
    let calendar = CalendarHandle::new(Arc::clone(&config))?;

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(CalendarFeed::new(calendar.clone()));
    let component_manager = Arc::new(component_manager);

    // Create a shared data context for commands
    let command_data =
        CommandContext::new(Arc::clone(&config), calendar.clone(), subscribers.clone());

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_calendar = calendar.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_calendar).await;
    });

    let client_result = serenity::ClientBuilder::new(token, intents)
        .framework(poise::Framework::new(
            options,
            move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("{} is connected!", ready.user.name);

                    // Set the bot's status
                    ctx.set_presence(
                        Some(serenity::ActivityData::watching(&activity)),
                        OnlineStatus::Online,
                    );
                    info!("Setting activity to {}", activity);

                    // Initialize components
                    if let Err(e) = component_manager.init_all(ctx, subscribers).await {
                        error!("Failed to initialize components: {:?}", e);
                    }

                    // Register slash commands
                    if let Err(e) =
                        poise::builtins::register_globally(ctx, &framework.options().commands).await
                    {
                        error!("Failed to register slash commands: {:?}", e);
                    } else {
                        info!("Slash commands registered successfully");
                    }

                    Ok(command_data)
                })
            },
        ))
        .await;

    // Start the bot
    info!("Starting bot...");
    let mut client = client_result.map_err(Error::from)?;

    // Create a separate task to handle the client
    let client_handle = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            Err(Error::from(e))
        } else {
            Ok(())
        }
    });

    // Wait for either the client to end or a shutdown signal
    tokio::select! {
        result = client_handle => {
            info!("Bot process ended");
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => {
                    error!("Client task error: {:?}", e);
                    Err(Error::Other(format!("Client task error: {}", e)).into())
                }
            }
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, shutting down bot...");
            Ok(())
        }
    }
}

/// Handle errors from commands
async fn on_error(error: poise::FrameworkError<'_, CommandContext, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Error during setup: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed(
                            &t!("error_title", context = "command"),
                            &format!("{}", error),
                        ))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            let command = &ctx.command().name;
            error!("Invalid arguments for command '{}': {:?}", command, error);
            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .embed(create_error_embed(
                            &t!("error_title", context = command),
                            &format!("{}", error),
                        ))
                        .ephemeral(true),
                )
                .await
            {
                error!("Error while sending error message: {:?}", e);
            }
        }
        poise::FrameworkError::UnknownCommand {
            ctx,
            msg,
            prefix,
            msg_content,
            ..
        } => {
            let command = msg_content.split_whitespace().next().unwrap_or_default();
            info!("Unknown command '{}' in channel {}", command, msg.channel_id);
            let reply = t!("unknown_command", command = command, prefix = prefix);
            if let Err(e) = msg
                .channel_id
                .send_message(ctx, CreateMessage::new().content(reply))
                .await
            {
                error!("Error while sending unknown command reply: {:?}", e);
            }
        }
        error => {
            error!("Other error: {:?}", error);
        }
    }
}

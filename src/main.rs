use kalenderbot::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Kalenderbot");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the bot
    startup::start_bot(config).await
}

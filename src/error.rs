use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Discord API error: {0}")]
    #[diagnostic(code(kalenderbot::discord_api))]
    DiscordApi(#[from] serenity::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(kalenderbot::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(kalenderbot::config))]
    Config(String),

    #[error("Calendar fetch error: {0}")]
    #[diagnostic(
        code(kalenderbot::fetch),
        help("the cycle is skipped and retried on the next tick")
    )]
    Fetch(String),

    #[error("Calendar parse error: {0}")]
    #[diagnostic(code(kalenderbot::parse))]
    Parse(String),

    #[error("Delivery error: {0}")]
    #[diagnostic(code(kalenderbot::delivery))]
    Delivery(String),

    #[error("Subscriber store error: {0}")]
    #[diagnostic(code(kalenderbot::subscribers))]
    Subscriber(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(kalenderbot::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(kalenderbot::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(kalenderbot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(kalenderbot::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create calendar fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create calendar parse errors
pub fn parse_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}

/// Helper to create delivery errors
pub fn delivery_error(message: &str) -> Error {
    Error::Delivery(message.to_string())
}

/// Helper to create subscriber store errors
pub fn subscriber_error(message: &str) -> Error {
    Error::Subscriber(message.to_string())
}

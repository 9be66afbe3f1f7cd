use crate::components::calendar_feed::EventIdentity;
use crate::error::{config_error, env_error, BotResult};
use crate::utils::i18n::resolve_locale;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Default activity text for the bot
pub const DEFAULT_ACTIVITY: &str = "the calendar";

/// Default polling interval in seconds
pub const DEFAULT_CHECK_INTERVAL: u64 = 60;

/// Default reminder offset in minutes
pub const DEFAULT_REMINDER_OFFSET_MINUTES: i64 = 120;

/// Upper bounds, one week each
const MAX_CHECK_INTERVAL: u64 = 7 * 24 * 60 * 60;
const MAX_REMINDER_OFFSET_MINUTES: i64 = 7 * 24 * 60;

/// Locations of the files the bot persists its state in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    /// Latest fetched calendar document
    pub calendar_new: PathBuf,
    /// Calendar document the last notification pass was based on
    pub calendar: PathBuf,
    /// Channels subscribed to new event notifications
    pub notify_subscribers: PathBuf,
    /// Channels subscribed to reminders
    pub reminder_subscribers: PathBuf,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            calendar_new: PathBuf::from("data/calendar_new.ics"),
            calendar: PathBuf::from("data/calendar.ics"),
            notify_subscribers: PathBuf::from("data/notify_subscribers.txt"),
            reminder_subscribers: PathBuf::from("data/reminder_subscribers.txt"),
        }
    }
}

/// Main configuration structure for the bot
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// URL of the iCalendar document to watch
    pub calendar_url: String,
    /// Polling interval in seconds
    pub check_interval: u64,
    /// How long before an event starts the reminder goes out
    pub reminder_offset_minutes: i64,
    /// Timezone events are compared and displayed in
    pub timezone: String,
    /// Locale for bot messages, always one of the supported locales
    pub bot_locale: String,
    /// Bot activity status text
    pub activity: String,
    /// Prefix for text commands
    pub command_prefix: String,
    /// How events are matched between snapshots
    pub event_identity: EventIdentity,
    /// Persisted state
    pub files: DataFiles,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            calendar_url: String::new(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            reminder_offset_minutes: DEFAULT_REMINDER_OFFSET_MINUTES,
            timezone: String::from("UTC"),
            bot_locale: String::from("en"),
            activity: String::from(DEFAULT_ACTIVITY),
            command_prefix: String::from("!"),
            event_identity: EventIdentity::Summary,
            files: DataFiles::default(),
            components: default_components(),
        }
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("calendar_feed".to_string(), true);
    components
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|name| env::var(name).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            let file_components = toml::from_str::<HashMap<String, bool>>(&content)?;
            config.components.extend(file_components);
        }

        Ok(config)
    }

    /// Build and validate a configuration from variables provided by `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        let defaults = Config::default();

        let discord_token = lookup("DISCORD_TOKEN").ok_or_else(|| env_error("DISCORD_TOKEN"))?;
        let calendar_url = lookup("CALENDAR_URL").ok_or_else(|| env_error("CALENDAR_URL"))?;

        let check_interval = match lookup("CHECK_INTERVAL") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid CHECK_INTERVAL format"))?,
            None => defaults.check_interval,
        };

        let reminder_offset_minutes = match lookup("REMINDER_OFFSET_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| config_error("Invalid REMINDER_OFFSET_MINUTES format"))?,
            None => defaults.reminder_offset_minutes,
        };

        let event_identity = match lookup("EVENT_IDENTITY") {
            Some(value) => value.parse::<EventIdentity>()?,
            None => defaults.event_identity,
        };

        let bot_locale = match lookup("BOT_LOCALE") {
            Some(value) => resolve_locale(&value).to_string(),
            None => defaults.bot_locale,
        };

        let path = |name: &str, default: PathBuf| {
            lookup(name).map(PathBuf::from).unwrap_or(default)
        };
        let files = DataFiles {
            calendar_new: path("CALENDAR_FILE_NEW", defaults.files.calendar_new),
            calendar: path("CALENDAR_FILE", defaults.files.calendar),
            notify_subscribers: path("NOTIFY_SUBSCRIBERS_FILE", defaults.files.notify_subscribers),
            reminder_subscribers: path(
                "REMINDER_SUBSCRIBERS_FILE",
                defaults.files.reminder_subscribers,
            ),
        };

        let config = Config {
            discord_token,
            calendar_url,
            check_interval,
            reminder_offset_minutes,
            timezone: lookup("TIMEZONE").unwrap_or(defaults.timezone),
            bot_locale,
            activity: lookup("BOT_ACTIVITY").unwrap_or(defaults.activity),
            command_prefix: lookup("COMMAND_PREFIX").unwrap_or(defaults.command_prefix),
            event_identity,
            files,
            components: defaults.components,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the bot cannot run with
    pub fn validate(&self) -> BotResult<()> {
        if self.check_interval == 0 || self.check_interval > MAX_CHECK_INTERVAL {
            return Err(config_error(&format!(
                "CHECK_INTERVAL must be between 1 and {} seconds",
                MAX_CHECK_INTERVAL
            )));
        }
        if self.reminder_offset_minutes <= 0
            || self.reminder_offset_minutes > MAX_REMINDER_OFFSET_MINUTES
        {
            return Err(config_error(&format!(
                "REMINDER_OFFSET_MINUTES must be between 1 and {}",
                MAX_REMINDER_OFFSET_MINUTES
            )));
        }
        Url::parse(&self.calendar_url)
            .map_err(|e| config_error(&format!("Invalid CALENDAR_URL: {}", e)))?;
        self.tz()?;
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> BotResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Polling interval as a duration
    pub fn poll_interval(&self) -> chrono::Duration {
        i64::try_from(self.check_interval)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Reminder offset as a duration
    pub fn reminder_offset(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.reminder_offset_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

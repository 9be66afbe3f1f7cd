use crate::error::{config_error, Error};
use chrono::DateTime;
use chrono_tz::Tz;
use std::str::FromStr;

/// A calendar event as parsed from the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<String>,
    pub uid: Option<String>,
    /// Start and end were given as dates without a time of day
    pub all_day: bool,
}

/// How an event in the new snapshot is recognized in the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventIdentity {
    /// Same summary text means same event
    #[default]
    Summary,
    /// Same calendar UID, falling back to the summary when there is none
    Uid,
}

impl EventIdentity {
    /// Key two events are compared by
    pub fn key<'a>(&self, event: &'a Event) -> &'a str {
        match self {
            EventIdentity::Summary => &event.summary,
            EventIdentity::Uid => event.uid.as_deref().unwrap_or(&event.summary),
        }
    }
}

impl FromStr for EventIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(EventIdentity::Summary),
            "uid" => Ok(EventIdentity::Uid),
            other => Err(config_error(&format!(
                "Invalid EVENT_IDENTITY '{}', expected 'summary' or 'uid'",
                other
            ))),
        }
    }
}

/// Result of comparing the fetched calendar with the committed one
#[derive(Debug, Clone, Default)]
pub struct CalendarUpdate {
    /// Future events not present in the committed snapshot
    pub new_events: Vec<Event>,
    /// Committed events starting inside the reminder window
    pub reminders: Vec<Event>,
}

/// Snapshot of the calendar feed's state for the status command
#[derive(Debug, Clone, Default)]
pub struct FeedStatus {
    pub last_sync: Option<DateTime<chrono::Utc>>,
    pub committed_events: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(summary: &str, uid: Option<&str>) -> Event {
        let start = chrono_tz::UTC.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        Event {
            summary: summary.to_string(),
            description: None,
            start,
            end: start,
            location: None,
            uid: uid.map(str::to_string),
            all_day: false,
        }
    }

    #[test]
    fn test_identity_parsing() {
        assert_eq!("summary".parse::<EventIdentity>().unwrap(), EventIdentity::Summary);
        assert_eq!(" UID ".parse::<EventIdentity>().unwrap(), EventIdentity::Uid);
        assert!("title".parse::<EventIdentity>().is_err());
    }

    #[test]
    fn test_identity_keys() {
        let with_uid = event("Standup", Some("abc@example.com"));
        let without_uid = event("Standup", None);

        assert_eq!(EventIdentity::Summary.key(&with_uid), "Standup");
        assert_eq!(EventIdentity::Uid.key(&with_uid), "abc@example.com");
        assert_eq!(EventIdentity::Uid.key(&without_uid), "Standup");
    }
}

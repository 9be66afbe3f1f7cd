#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kalenderbot::components::calendar_feed::MessageSink;
use kalenderbot::config::Config;
use kalenderbot::error::{delivery_error, BotResult};
use std::path::Path;
use tokio::sync::Mutex;

/// Message sink that records what would have been sent
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing: Vec<String>,
}

impl RecordingSink {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Messages sent to `chat_id`, in order
    pub async fn messages_to(&self, chat_id: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, chat_id: &str, text: &str) -> BotResult<()> {
        if self.failing.iter().any(|id| id == chat_id) {
            return Err(delivery_error("chat not reachable"));
        }
        self.sent
            .lock()
            .await
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Config pointing at `url` with all data files inside `dir`, loaded the way
/// the bot loads its environment
pub fn test_config(url: &str, dir: &Path, extra: &[(&str, &str)]) -> Config {
    let file = |name: &str| dir.join(name).to_string_lossy().into_owned();
    let mut vars = vec![
        ("DISCORD_TOKEN".to_string(), "test-token".to_string()),
        ("CALENDAR_URL".to_string(), url.to_string()),
        ("CALENDAR_FILE_NEW".to_string(), file("calendar_new.ics")),
        ("CALENDAR_FILE".to_string(), file("calendar.ics")),
        ("NOTIFY_SUBSCRIBERS_FILE".to_string(), file("notify_subscribers.txt")),
        ("REMINDER_SUBSCRIBERS_FILE".to_string(), file("reminder_subscribers.txt")),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    Config::from_lookup(|name| {
        vars.iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    })
    .unwrap()
}

/// Build an iCalendar document from (summary, start) pairs, each lasting an hour
pub fn calendar(events: &[(&str, DateTime<Utc>)]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//kalenderbot//tests//EN\r\n");
    for (i, (summary, start)) in events.iter().enumerate() {
        let end = *start + chrono::Duration::hours(1);
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("UID:event-{}@tests\r\n", i));
        out.push_str(&format!("SUMMARY:{}\r\n", summary));
        out.push_str(&format!("DTSTART:{}\r\n", start.format("%Y%m%dT%H%M%SZ")));
        out.push_str(&format!("DTEND:{}\r\n", end.format("%Y%m%dT%H%M%SZ")));
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

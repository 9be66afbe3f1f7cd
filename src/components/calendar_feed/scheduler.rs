use super::format::{new_events_message, reminder_message, split_message, MESSAGE_LIMIT};
use super::handle::CalendarHandle;
use super::notifications::{broadcast, DeliveryReport, MessageSink};
use crate::components::subscribers::{Category, SharedSubscribers};
use crate::config::Config;
use crate::error::BotResult;
use std::sync::Arc;
use tokio::time::{interval, Duration as TokioDuration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What one notification cycle did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub new_events: usize,
    pub reminders: usize,
    pub notified: DeliveryReport,
    pub reminded: DeliveryReport,
}

/// Periodic task that runs the notification cycle
pub struct CalendarScheduler {
    token: CancellationToken,
}

impl CalendarScheduler {
    /// Spawn the scheduler loop. The first cycle runs immediately.
    pub fn start(
        sink: Arc<dyn MessageSink>,
        config: Arc<Config>,
        handle: CalendarHandle,
        subscribers: SharedSubscribers,
    ) -> Self {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        tokio::spawn(async move {
            run_scheduler_loop(sink, config, handle, subscribers, loop_token).await;
        });

        Self { token }
    }

    /// Stop the scheduler loop after the current cycle
    pub fn stop(&self) {
        self.token.cancel();
    }
}

async fn run_scheduler_loop(
    sink: Arc<dyn MessageSink>,
    config: Arc<Config>,
    handle: CalendarHandle,
    subscribers: SharedSubscribers,
    token: CancellationToken,
) {
    let mut ticker = interval(TokioDuration::from_secs(config.check_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        "Calendar scheduler started, checking every {} seconds",
        config.check_interval
    );

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Calendar scheduler stopped");
                break;
            }
            _ = ticker.tick() => {}
        }

        match run_cycle(&handle, &subscribers, sink.as_ref(), &config).await {
            Ok(report) if report.new_events > 0 || report.reminders > 0 => {
                info!(
                    "Announced {} new event(s) to {} channel(s) and {} reminder(s) to {} channel(s), {} delivery failure(s)",
                    report.new_events,
                    report.notified.delivered,
                    report.reminders,
                    report.reminded.delivered,
                    report.notified.failed + report.reminded.failed
                );
            }
            Ok(_) => debug!("Calendar cycle finished without notifications"),
            Err(e) => {
                error!("Calendar cycle failed, skipping until next tick: {}", e);
                handle.record_failure(e.to_string()).await;
            }
        }
    }
}

/// One fetch, diff, notify and commit pass.
///
/// New events go to the new-event subscribers, due reminders to the
/// reminder subscribers. The snapshot is only committed when everything
/// before it succeeded; individual delivery failures do not count as
/// failure.
pub async fn run_cycle(
    handle: &CalendarHandle,
    subscribers: &SharedSubscribers,
    sink: &dyn MessageSink,
    config: &Config,
) -> BotResult<CycleReport> {
    let update = handle.check_updates().await?;
    let locale = config.bot_locale.as_str();

    let mut report = CycleReport {
        new_events: update.new_events.len(),
        reminders: update.reminders.len(),
        ..Default::default()
    };

    if let Some(message) = new_events_message(&update.new_events, locale) {
        let recipients = subscribers.lock().await.list(Category::NewEvents).await?;
        report.notified =
            broadcast(sink, &recipients, &split_message(&message, MESSAGE_LIMIT)).await;
    }

    if let Some(message) =
        reminder_message(&update.reminders, config.reminder_offset_minutes, locale)
    {
        let recipients = subscribers.lock().await.list(Category::Reminders).await?;
        report.reminded =
            broadcast(sink, &recipients, &split_message(&message, MESSAGE_LIMIT)).await;
    }

    handle.commit().await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::subscribers::SubscriberStore;
    use crate::config::DataFiles;
    use crate::error::BotResult;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio::time::{sleep, Instant};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Plenum\r\nDTSTART:20991231T170000Z\r\nDTEND:20991231T180000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, chat_id: &str, text: &str) -> BotResult<()> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    async fn request_count(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_first_tick_runs_immediately_and_stop_ends_the_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles {
            calendar_new: dir.path().join("calendar_new.ics"),
            calendar: dir.path().join("calendar.ics"),
            notify_subscribers: dir.path().join("notify.txt"),
            reminder_subscribers: dir.path().join("remind.txt"),
        };
        let config = Arc::new(Config {
            calendar_url: server.uri(),
            check_interval: 1,
            files: files.clone(),
            ..Config::default()
        });
        let subscribers = SubscriberStore::from_files(&files).shared();
        subscribers
            .lock()
            .await
            .add("100", Category::NewEvents)
            .await
            .unwrap();

        let handle = CalendarHandle::new(Arc::clone(&config)).unwrap();
        let sink = Arc::new(RecordingSink::default());
        let scheduler = CalendarScheduler::start(
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&config),
            handle.clone(),
            subscribers,
        );

        // Well before the first period ends
        let deadline = Instant::now() + TokioDuration::from_millis(900);
        while !files.calendar.exists() && Instant::now() < deadline {
            sleep(TokioDuration::from_millis(20)).await;
        }
        assert!(files.calendar.exists());
        let sent = sink.sent.lock().await.clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "100");
        assert!(sent[0].1.contains("Plenum"));

        scheduler.stop();
        sleep(TokioDuration::from_millis(100)).await;
        let requests = request_count(&server).await;
        sleep(TokioDuration::from_millis(2500)).await;
        assert_eq!(request_count(&server).await, requests);
    }
}

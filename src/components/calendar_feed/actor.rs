use super::diff::diff_events;
use super::fetcher::CalendarFetcher;
use super::models::{CalendarUpdate, Event, FeedStatus};
use super::reminder::select_reminders;
use super::snapshot::{Staged, SnapshotStore};
use crate::config::Config;
use crate::error::{component_error, BotResult};
use crate::utils::time::now_in;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The calendar actor owns the calendar files and processes one command at a time
pub struct CalendarActor {
    config: Arc<Config>,
    tz: Tz,
    fetcher: CalendarFetcher,
    snapshots: SnapshotStore,
    status: FeedStatus,
    pending: Option<Staged>,
    command_rx: mpsc::Receiver<CalendarCommand>,
}

/// Commands that can be sent to the calendar actor
pub enum CalendarCommand {
    CheckUpdates(mpsc::Sender<BotResult<CalendarUpdate>>),
    ListEvents(mpsc::Sender<BotResult<Vec<Event>>>),
    Commit(mpsc::Sender<BotResult<()>>),
    RecordFailure(String),
    Status(mpsc::Sender<FeedStatus>),
    Shutdown,
}

/// Handle for communicating with the calendar actor
#[derive(Debug, Clone)]
pub struct CalendarActorHandle {
    command_tx: mpsc::Sender<CalendarCommand>,
}

impl CalendarActorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(mpsc::Sender<T>) -> CalendarCommand,
    ) -> BotResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Fetch if due and compare against the committed snapshot
    pub async fn check_updates(&self) -> BotResult<CalendarUpdate> {
        self.request(CalendarCommand::CheckUpdates).await?
    }

    /// All future events of the latest calendar, sorted by start
    pub async fn list_events(&self) -> BotResult<Vec<Event>> {
        self.request(CalendarCommand::ListEvents).await?
    }

    /// Make the latest fetched calendar the new baseline
    pub async fn commit(&self) -> BotResult<()> {
        self.request(CalendarCommand::Commit).await?
    }

    /// Remember why the last cycle failed
    pub async fn record_failure(&self, reason: String) {
        let _ = self
            .command_tx
            .send(CalendarCommand::RecordFailure(reason))
            .await;
    }

    pub async fn status(&self) -> BotResult<FeedStatus> {
        self.request(CalendarCommand::Status).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(CalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl CalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<Config>) -> BotResult<(Self, CalendarActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let tz = config.tz()?;
        let fetcher = CalendarFetcher::new(
            config.calendar_url.clone(),
            config.files.calendar_new.clone(),
            std::time::Duration::from_secs(config.check_interval),
        )?;
        let snapshots = SnapshotStore::new(
            config.files.calendar_new.clone(),
            config.files.calendar.clone(),
            tz,
        );

        let actor = Self {
            config,
            tz,
            fetcher,
            snapshots,
            status: FeedStatus::default(),
            pending: None,
            command_rx,
        };

        Ok((actor, CalendarActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CalendarCommand::CheckUpdates(response_tx) => {
                    let result = self.check_updates().await;
                    let _ = response_tx.send(result).await;
                }
                CalendarCommand::ListEvents(response_tx) => {
                    let result = self.list_events().await;
                    let _ = response_tx.send(result).await;
                }
                CalendarCommand::Commit(response_tx) => {
                    let result = self.commit().await;
                    let _ = response_tx.send(result).await;
                }
                CalendarCommand::RecordFailure(reason) => {
                    self.status.last_error = Some(reason);
                }
                CalendarCommand::Status(response_tx) => {
                    let _ = response_tx.send(self.status.clone()).await;
                }
                CalendarCommand::Shutdown => {
                    info!("Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Calendar actor shut down");
    }

    async fn check_updates(&mut self) -> BotResult<CalendarUpdate> {
        self.fetcher.refresh().await?;

        let current = self.snapshots.current().await?;
        let previous = self.snapshots.committed().await?;
        let now = now_in(self.tz);

        let new_events = diff_events(
            &current.events,
            previous.as_deref(),
            now,
            false,
            self.config.event_identity,
        );
        let reminders = previous
            .as_deref()
            .map(|events| {
                select_reminders(
                    events,
                    now,
                    self.config.reminder_offset(),
                    self.config.poll_interval(),
                )
            })
            .unwrap_or_default();

        debug!(
            "Calendar has {} events, {} new, {} due for a reminder",
            current.events.len(),
            new_events.len(),
            reminders.len()
        );
        self.pending = Some(current);

        Ok(CalendarUpdate {
            new_events,
            reminders,
        })
    }

    async fn list_events(&self) -> BotResult<Vec<Event>> {
        self.fetcher.refresh().await?;
        let current = self.snapshots.current().await?;
        Ok(diff_events(
            &current.events,
            None,
            now_in(self.tz),
            true,
            self.config.event_identity,
        ))
    }

    /// Commit the document the last update check was based on
    async fn commit(&mut self) -> BotResult<()> {
        let staged = self
            .pending
            .take()
            .ok_or_else(|| component_error("No checked calendar to commit"))?;
        self.snapshots.commit(&staged).await?;
        self.status.last_sync = Some(Utc::now());
        self.status.committed_events = staged.events.len();
        self.status.last_error = None;
        Ok(())
    }
}

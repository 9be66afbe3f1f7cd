use super::actor::{CalendarActor, CalendarActorHandle};
use super::models::{CalendarUpdate, Event, FeedStatus};
use crate::config::Config;
use crate::error::BotResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the calendar actor
#[derive(Debug, Clone)]
pub struct CalendarHandle {
    actor_handle: CalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl CalendarHandle {
    /// Create a new CalendarHandle and spawn the actor
    pub fn new(config: Arc<Config>) -> BotResult<Self> {
        let (mut actor, handle) = CalendarActor::new(config)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Fetch if due and compare against the committed snapshot
    pub async fn check_updates(&self) -> BotResult<CalendarUpdate> {
        self.actor_handle.check_updates().await
    }

    /// All future events of the latest calendar
    pub async fn list_events(&self) -> BotResult<Vec<Event>> {
        self.actor_handle.list_events().await
    }

    /// Make the latest fetched calendar the new baseline
    pub async fn commit(&self) -> BotResult<()> {
        self.actor_handle.commit().await
    }

    /// Remember why the last cycle failed
    pub async fn record_failure(&self, reason: String) {
        self.actor_handle.record_failure(reason).await
    }

    pub async fn status(&self) -> BotResult<FeedStatus> {
        self.actor_handle.status().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        self.actor_handle.shutdown().await
    }
}

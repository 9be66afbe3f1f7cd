mod actor;
pub mod diff;
pub mod fetcher;
pub mod format;
mod handle;
pub mod models;
pub mod notifications;
pub mod parser;
pub mod reminder;
mod scheduler;
pub mod snapshot;

pub use handle::CalendarHandle;
pub use models::{CalendarUpdate, Event, EventIdentity, FeedStatus};
pub use notifications::{DiscordSink, MessageSink};
pub use scheduler::{run_cycle, CalendarScheduler, CycleReport};

use super::subscribers::SharedSubscribers;
use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Calendar feed component: watches the calendar and notifies subscribers
pub struct CalendarFeed {
    handle: CalendarHandle,
    scheduler: RwLock<Option<CalendarScheduler>>,
}

impl CalendarFeed {
    /// Create the component around an already running calendar actor
    pub fn new(handle: CalendarHandle) -> Self {
        Self {
            handle,
            scheduler: RwLock::new(None),
        }
    }
}

#[async_trait]
impl super::Component for CalendarFeed {
    fn name(&self) -> &'static str {
        "calendar_feed"
    }

    async fn init(
        &self,
        ctx: &serenity::Context,
        config: Arc<Config>,
        subscribers: SharedSubscribers,
    ) -> BotResult<()> {
        let mut scheduler = self.scheduler.write().await;
        if scheduler.is_some() {
            warn!("Calendar scheduler is already running, skipping initialization");
            return Ok(());
        }

        info!("Starting calendar scheduler");
        let sink: Arc<dyn MessageSink> = Arc::new(DiscordSink::new(Arc::clone(&ctx.http)));
        *scheduler = Some(CalendarScheduler::start(
            sink,
            config,
            self.handle.clone(),
            subscribers,
        ));

        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        if let Some(scheduler) = self.scheduler.write().await.take() {
            scheduler.stop();
        }
        self.handle.shutdown().await
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

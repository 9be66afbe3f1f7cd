use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::info;

// Export components
pub mod calendar_feed;
pub mod subscribers;

// Re-export the calendar handle and the shared subscriber store
pub use calendar_feed::CalendarHandle;
pub use subscribers::{Category, SharedSubscribers, SubscriberStore};

/// Component trait that all components must implement
#[async_trait]
pub trait Component: Send + Sync + Any {
    /// Get the name of the component
    fn name(&self) -> &'static str;

    /// Initialize the component
    async fn init(
        &self,
        ctx: &serenity::Context,
        config: Arc<Config>,
        subscribers: SharedSubscribers,
    ) -> BotResult<()>;

    /// Shutdown the component
    async fn shutdown(&self) -> BotResult<()>;

    /// Convert to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Manager for all components
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    config: Arc<Config>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentManager")
            .field("component_count", &self.components.len())
            .field("components", &self.config.components)
            .finish()
    }
}

impl ComponentManager {
    /// Create a new component manager
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    /// Register a component unless it is disabled in the configuration
    pub fn register<T: Component + 'static>(&mut self, component: T) {
        if !self.config.is_component_enabled(component.name()) {
            info!("Component {} is disabled, not registering", component.name());
            return;
        }

        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Initialize all registered components
    pub async fn init_all(
        &self,
        ctx: &serenity::Context,
        subscribers: SharedSubscribers,
    ) -> BotResult<()> {
        for component in &self.components {
            info!("Initializing component: {}", component.name());

            if let Err(e) = component
                .init(ctx, Arc::clone(&self.config), subscribers.clone())
                .await
            {
                // Log error but continue with other components
                tracing::error!("Error initializing component {}: {:?}", component.name(), e);
            }
        }

        Ok(())
    }

    /// Shutdown all components
    pub async fn shutdown_all(&self) -> BotResult<()> {
        info!("Shutting down all components");

        for component in &self.components {
            info!("Shutting down component: {}", component.name());

            if let Err(e) = component.shutdown().await {
                // Log error but continue with other components
                tracing::error!(
                    "Error shutting down component {}: {:?}",
                    component.name(),
                    e
                );
            }
        }

        Ok(())
    }

    /// Get a component by name
    pub fn get_component_by_name(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }
}

use crate::config::DataFiles;
use crate::error::{subscriber_error, BotResult};
use crate::utils::fs::{read_optional, write_atomic};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Subscriber store shared between command handlers and the scheduler
pub type SharedSubscribers = Arc<Mutex<SubscriberStore>>;

/// Kinds of notifications a channel can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    NewEvents,
    Reminders,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::NewEvents, Category::Reminders];

    /// Translation key of the category's display name
    pub fn label_key(&self) -> &'static str {
        match self {
            Category::NewEvents => "category_new_events",
            Category::Reminders => "category_reminders",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::NewEvents => write!(f, "new-events"),
            Category::Reminders => write!(f, "reminders"),
        }
    }
}

/// Chat identifiers per category, one newline-delimited file each
#[derive(Debug, Clone)]
pub struct SubscriberStore {
    new_events: PathBuf,
    reminders: PathBuf,
}

impl SubscriberStore {
    pub fn new(new_events: PathBuf, reminders: PathBuf) -> Self {
        Self {
            new_events,
            reminders,
        }
    }

    pub fn from_files(files: &DataFiles) -> Self {
        Self::new(
            files.notify_subscribers.clone(),
            files.reminder_subscribers.clone(),
        )
    }

    /// Wrap the store for sharing
    pub fn shared(self) -> SharedSubscribers {
        Arc::new(Mutex::new(self))
    }

    fn path(&self, category: Category) -> &Path {
        match category {
            Category::NewEvents => &self.new_events,
            Category::Reminders => &self.reminders,
        }
    }

    /// All identifiers subscribed to `category`, in file order
    pub async fn list(&self, category: Category) -> BotResult<Vec<String>> {
        let path = self.path(category);
        let content = read_optional(path)
            .await
            .map_err(|e| subscriber_error(&format!("Failed to read {}: {}", path.display(), e)))?
            .unwrap_or_default();

        let mut ids: Vec<String> = Vec::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !ids.iter().any(|id| id == line) {
                ids.push(line.to_string());
            }
        }
        Ok(ids)
    }

    pub async fn contains(&self, id: &str, category: Category) -> BotResult<bool> {
        Ok(self.list(category).await?.iter().any(|known| known == id))
    }

    /// Subscribe `id`. Returns `false` if it already was subscribed.
    pub async fn add(&self, id: &str, category: Category) -> BotResult<bool> {
        let mut ids = self.list(category).await?;
        if ids.iter().any(|known| known == id) {
            warn!("{} is already subscribed to {}", id, category);
            return Ok(false);
        }

        ids.push(id.to_string());
        self.save(category, &ids).await?;
        info!("{} subscribed to {}", id, category);
        Ok(true)
    }

    /// Unsubscribe `id`. Returns `false` if it was not subscribed.
    pub async fn remove(&self, id: &str, category: Category) -> BotResult<bool> {
        let mut ids = self.list(category).await?;
        let before = ids.len();
        ids.retain(|known| known != id);
        if ids.len() == before {
            warn!("{} is not subscribed to {}", id, category);
            return Ok(false);
        }

        self.save(category, &ids).await?;
        info!("{} unsubscribed from {}", id, category);
        Ok(true)
    }

    async fn save(&self, category: Category, ids: &[String]) -> BotResult<()> {
        let mut content = ids.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        let path = self.path(category);
        write_atomic(path, content.as_bytes())
            .await
            .map_err(|e| subscriber_error(&format!("Failed to write {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> SubscriberStore {
        SubscriberStore::new(
            dir.path().join("notify.txt"),
            dir.path().join("remind.txt"),
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).list(Category::NewEvents).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_then_contains() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.add("123", Category::NewEvents).await.unwrap());
        assert!(store.contains("123", Category::NewEvents).await.unwrap());
        assert!(!store.contains("123", Category::Reminders).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_twice_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(store.add("123", Category::Reminders).await.unwrap());
        assert!(!store.add("123", Category::Reminders).await.unwrap());
        assert_eq!(store.list(Category::Reminders).await.unwrap(), vec!["123"]);
    }

    #[tokio::test]
    async fn test_remove_then_not_contains() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store.add("1", Category::NewEvents).await.unwrap();
        store.add("2", Category::NewEvents).await.unwrap();

        assert!(store.remove("1", Category::NewEvents).await.unwrap());
        assert!(!store.contains("1", Category::NewEvents).await.unwrap());
        assert!(!store.remove("1", Category::NewEvents).await.unwrap());
        assert_eq!(store.list(Category::NewEvents).await.unwrap(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_file_format_is_newline_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.add("1", Category::NewEvents).await.unwrap();
        store.add("2", Category::NewEvents).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("notify.txt")).unwrap();
        assert_eq!(content, "1\n2\n");
    }

    #[tokio::test]
    async fn test_duplicates_and_blank_lines_on_disk_collapse() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("remind.txt"), "5\n\n 7 \n5\n").unwrap();

        let ids = store(&dir).list(Category::Reminders).await.unwrap();
        assert_eq!(ids, vec!["5", "7"]);
    }
}

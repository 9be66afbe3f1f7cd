use super::models::Event;
use super::parser::parse_events;
use crate::error::{parse_error, BotResult};
use crate::utils::fs::{read_optional, write_atomic};
use chrono_tz::Tz;
use std::path::PathBuf;
use tracing::{info, warn};

/// A fetched calendar document together with its parsed events
#[derive(Debug, Clone)]
pub struct Staged {
    pub content: String,
    pub events: Vec<Event>,
}

/// The two calendar documents kept on disk: the latest fetch ("staging")
/// and the one the last notification pass was based on ("committed").
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    staging: PathBuf,
    committed: PathBuf,
    tz: Tz,
}

impl SnapshotStore {
    pub fn new(staging: PathBuf, committed: PathBuf, tz: Tz) -> Self {
        Self {
            staging,
            committed,
            tz,
        }
    }

    /// The latest fetched document
    pub async fn current(&self) -> BotResult<Staged> {
        let content = read_optional(&self.staging).await?.ok_or_else(|| {
            parse_error(&format!(
                "No calendar document at {}",
                self.staging.display()
            ))
        })?;
        let events = parse_events(&content, self.tz)?;
        Ok(Staged { content, events })
    }

    /// Events of the committed document, `None` when there is none yet.
    ///
    /// A committed document that no longer parses is treated as missing so
    /// the next commit replaces it.
    pub async fn committed(&self) -> BotResult<Option<Vec<Event>>> {
        let Some(content) = read_optional(&self.committed).await? else {
            return Ok(None);
        };
        match parse_events(&content, self.tz) {
            Ok(events) => Ok(Some(events)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable snapshot {}: {}",
                    self.committed.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Make `staged` the new baseline
    pub async fn commit(&self, staged: &Staged) -> BotResult<()> {
        write_atomic(&self.committed, staged.content.as_bytes()).await?;
        info!("Committed calendar snapshot to {}", self.committed.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Plenum\r\nDTSTART:20300115T170000Z\r\nDTEND:20300115T180000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    fn store(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(
            dir.path().join("calendar_new.ics"),
            dir.path().join("calendar.ics"),
            chrono_tz::UTC,
        )
    }

    #[tokio::test]
    async fn test_missing_committed_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).committed().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_staging_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).current().await.is_err());
    }

    #[tokio::test]
    async fn test_commit_stores_staged_document() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = store(&dir);
        std::fs::write(dir.path().join("calendar_new.ics"), CALENDAR).unwrap();

        let staged = snapshots.current().await.unwrap();
        snapshots.commit(&staged).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("calendar.ics")).unwrap(),
            CALENDAR
        );

        let committed = snapshots.committed().await.unwrap().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].summary, "Plenum");
    }

    #[tokio::test]
    async fn test_unreadable_committed_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calendar.ics"), "garbage").unwrap();
        assert!(store(&dir).committed().await.unwrap().is_none());
    }
}

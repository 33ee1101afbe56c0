use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::{apply_reschedule, ChangeEvent, TicketStore, CHANGE_FEED_CAPACITY};
use crate::error::StoreError;
use crate::io::file::{decode_board, encode_board};
use crate::model::TimelineItem;

/// A board kept as a single JSON document on disk.
///
/// Every update rewrites the whole document. Writes from this process are
/// serialised; writes from elsewhere simply race (last one wins).
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            changes,
        }
    }
}

#[async_trait]
impl TicketStore for JsonFileStore {
    async fn load_items(&self) -> Result<Vec<TimelineItem>, StoreError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let report = decode_board(&json)?;
        tracing::info!(
            path = %self.path.display(),
            items = report.items.len(),
            skipped = report.skipped,
            "loaded board"
        );
        Ok(report.items)
    }

    async fn update_ticket_scheduled_date(&self, ticket_id: Uuid, new_date: NaiveDate) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let json = tokio::fs::read_to_string(&self.path).await?;
        let mut report = decode_board(&json)?;
        apply_reschedule(&mut report.items, ticket_id, new_date)?;
        tokio::fs::write(&self.path, encode_board(&report.name, &report.items)?).await?;
        tracing::info!(ticket = %ticket_id, date = %new_date, path = %self.path.display(), "ticket rescheduled");
        let _ = self.changes.send(ChangeEvent::TicketRescheduled {
            ticket_id,
            scheduled_date: new_date,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file::{load_board, save_board};
    use crate::model::TicketBlock;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn update_is_persisted_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let ticket = TicketBlock::new("Roof leak", ymd(2024, 5, 2));
        let id = ticket.id;
        save_board("East", &[ticket.into()], &path).unwrap();

        let store = JsonFileStore::new(&path);
        store.update_ticket_scheduled_date(id, ymd(2024, 5, 6)).await.unwrap();

        let report = load_board(&path).unwrap();
        assert_eq!(report.name, "East");
        assert_eq!(report.items[0].anchor_date(), ymd(2024, 5, 6));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(matches!(store.load_items().await, Err(StoreError::Io(_))));
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{apply_reschedule, ChangeEvent, TicketStore, CHANGE_FEED_CAPACITY};
use crate::error::StoreError;
use crate::model::TimelineItem;

/// In-process store. Backs the sample board and tests.
pub struct MemoryStore {
    items: RwLock<Vec<TimelineItem>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new(items: Vec<TimelineItem>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            items: RwLock::new(items),
            changes,
        }
    }

    /// Replace every item and tell subscribers.
    pub fn replace(&self, items: Vec<TimelineItem>) {
        *self.items.write() = items;
        let _ = self.changes.send(ChangeEvent::Reloaded);
    }

    pub fn snapshot(&self) -> Vec<TimelineItem> {
        self.items.read().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn load_items(&self) -> Result<Vec<TimelineItem>, StoreError> {
        Ok(self.snapshot())
    }

    async fn update_ticket_scheduled_date(&self, ticket_id: Uuid, new_date: NaiveDate) -> Result<(), StoreError> {
        apply_reschedule(&mut self.items.write(), ticket_id, new_date)?;
        tracing::info!(ticket = %ticket_id, date = %new_date, "ticket rescheduled");
        // No subscribers is fine.
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
    use crate::model::TicketBlock;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn update_changes_the_ticket_and_notifies_subscribers() {
        let ticket = TicketBlock::new("Gate repair", ymd(2024, 3, 4));
        let id = ticket.id;
        let store = MemoryStore::new(vec![ticket.into()]);
        let mut feed = store.subscribe();

        store.update_ticket_scheduled_date(id, ymd(2024, 3, 9)).await.unwrap();

        let items = store.load_items().await.unwrap();
        assert_eq!(items[0].anchor_date(), ymd(2024, 3, 9));
        assert_eq!(
            feed.recv().await.unwrap(),
            ChangeEvent::TicketRescheduled {
                ticket_id: id,
                scheduled_date: ymd(2024, 3, 9),
            }
        );
    }

    #[tokio::test]
    async fn unknown_ticket_is_rejected() {
        let store = MemoryStore::new(vec![TimelineItem::milestone("m", ymd(2024, 3, 1))]);
        let milestone_id = store.snapshot()[0].id();
        let err = store
            .update_ticket_scheduled_date(milestone_id, ymd(2024, 3, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TicketNotFound(id) if id == milestone_id));
    }

    #[tokio::test]
    async fn replace_announces_a_reload() {
        let store = MemoryStore::default();
        let mut feed = store.subscribe();
        store.replace(vec![TimelineItem::milestone("Audit", ymd(2024, 4, 1))]);
        assert_eq!(feed.recv().await.unwrap(), ChangeEvent::Reloaded);
        assert_eq!(store.load_items().await.unwrap().len(), 1);
    }
}

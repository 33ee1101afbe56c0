//! The external data collaborator: where timeline items come from and where
//! reschedules go.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::TimelineItem;

/// Change feed capacity; lagging subscribers just re-fetch.
pub(crate) const CHANGE_FEED_CAPACITY: usize = 64;

/// Something changed at the store; subscribers re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    TicketRescheduled { ticket_id: Uuid, scheduled_date: NaiveDate },
    Reloaded,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Every item the timeline should show, in display order.
    async fn load_items(&self) -> Result<Vec<TimelineItem>, StoreError>;

    /// Overwrite a ticket's scheduled date. No version check; the last
    /// write to land wins.
    async fn update_ticket_scheduled_date(&self, ticket_id: Uuid, new_date: NaiveDate) -> Result<(), StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Set a ticket's date inside an item list.
pub(crate) fn apply_reschedule(items: &mut [TimelineItem], ticket_id: Uuid, new_date: NaiveDate) -> Result<(), StoreError> {
    let ticket = items.iter_mut().find_map(|item| match item {
        TimelineItem::Ticket(ticket) if ticket.id == ticket_id => Some(ticket),
        _ => None,
    });
    match ticket {
        Some(ticket) => {
            ticket.scheduled_date = new_date;
            Ok(())
        }
        None => Err(StoreError::TicketNotFound(ticket_id)),
    }
}

//! Turns a dropped drag into exactly one store write.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::RescheduleRequest;
use crate::notify::{Notification, Notify};
use crate::store::TicketStore;

/// Called with `(ticket_id, new_date)` after a successful write.
pub type RescheduleCallback = Arc<dyn Fn(Uuid, NaiveDate) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
    Rescheduled { ticket_id: Uuid, new_date: NaiveDate },
    Failed { ticket_id: Uuid, reason: String },
}

#[derive(Clone)]
pub struct Rescheduler {
    store: Arc<dyn TicketStore>,
    notifier: Arc<dyn Notify>,
    on_reschedule: Option<RescheduleCallback>,
}

impl Rescheduler {
    pub fn new(store: Arc<dyn TicketStore>, notifier: Arc<dyn Notify>) -> Self {
        Self {
            store,
            notifier,
            on_reschedule: None,
        }
    }

    pub fn on_reschedule(mut self, callback: RescheduleCallback) -> Self {
        self.on_reschedule = Some(callback);
        self
    }

    /// Issue the write and report it. No retry, and no local item is
    /// touched: the list refreshes from the store's change feed.
    pub async fn submit(&self, request: RescheduleRequest) -> RescheduleOutcome {
        let RescheduleRequest { ticket_id, new_date } = request;
        match self.store.update_ticket_scheduled_date(ticket_id, new_date).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "Ticket rescheduled to {}",
                    new_date.format("%Y-%m-%d")
                )));
                if let Some(callback) = &self.on_reschedule {
                    callback(ticket_id, new_date);
                }
                RescheduleOutcome::Rescheduled { ticket_id, new_date }
            }
            Err(e) => {
                tracing::warn!(ticket = %ticket_id, date = %new_date, error = %e, "reschedule failed");
                self.notifier
                    .notify(Notification::failure(format!("Could not reschedule ticket: {e}")));
                RescheduleOutcome::Failed {
                    ticket_id,
                    reason: e.to_string(),
                }
            }
        }
    }
}

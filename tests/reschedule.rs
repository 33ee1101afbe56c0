use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use dispatch_timeline::model::{
    DragController, DropOutcome, Granularity, ScaleConfig, TicketBlock, TimelineGeometry, TimelineItem, TimelineWindow,
};
use dispatch_timeline::notify::{Notification, NotificationKind, Notify};
use dispatch_timeline::reschedule::{RescheduleCallback, RescheduleOutcome, Rescheduler};
use dispatch_timeline::store::{ChangeEvent, MemoryStore, TicketStore};
use dispatch_timeline::StoreError;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Notification>>);

impl Recorder {
    fn kinds(&self) -> Vec<NotificationKind> {
        self.0.lock().iter().map(|n| n.kind).collect()
    }
}

impl Notify for Recorder {
    fn notify(&self, notification: Notification) {
        self.0.lock().push(notification);
    }
}

/// Store whose writes always fail.
struct RejectingStore {
    writes: AtomicUsize,
    changes: broadcast::Sender<ChangeEvent>,
}

impl RejectingStore {
    fn new() -> Self {
        Self {
            writes: AtomicUsize::new(0),
            changes: broadcast::channel(8).0,
        }
    }
}

#[async_trait]
impl TicketStore for RejectingStore {
    async fn load_items(&self) -> Result<Vec<TimelineItem>, StoreError> {
        Ok(Vec::new())
    }

    async fn update_ticket_scheduled_date(&self, _ticket_id: Uuid, _new_date: NaiveDate) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Rejected("backend unavailable".to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}

fn counting_callback() -> (Arc<AtomicUsize>, RescheduleCallback) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let callback: RescheduleCallback = Arc::new(move |_: Uuid, _: NaiveDate| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (calls, callback)
}

/// Drag `ticket` by `dx` pixels and release.
fn drag_by(ticket: &TicketBlock, window: &TimelineWindow, dx: f32) -> DropOutcome {
    let geometry = TimelineGeometry::default();
    let surface_left = 12.0;
    let block_left = geometry.content_left(surface_left) + window.to_offset(ticket.scheduled_date);
    let grab = block_left + 6.0;

    let mut drag = DragController::new(geometry);
    drag.begin(ticket, grab, block_left, window).unwrap();
    drag.drop_at(grab + dx, surface_left, window)
}

#[tokio::test]
async fn successful_drop_writes_once_and_calls_back() {
    let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
    let ticket = TicketBlock::new("Compressor swap", ymd(2024, 3, 10));
    let store = Arc::new(MemoryStore::new(vec![TimelineItem::from(ticket.clone())]));
    let mut feed = store.subscribe();
    let notes = Arc::new(Recorder::default());
    let (calls, callback) = counting_callback();
    let rescheduler = Rescheduler::new(store.clone(), notes.clone()).on_reschedule(callback);

    let DropOutcome::Reschedule(request) = drag_by(&ticket, &window, 3.0 * 40.0) else {
        panic!("drop was cancelled");
    };
    let outcome = rescheduler.submit(request).await;

    assert_eq!(
        outcome,
        RescheduleOutcome::Rescheduled {
            ticket_id: ticket.id,
            new_date: ymd(2024, 3, 13)
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(notes.kinds(), vec![NotificationKind::Success]);
    assert_eq!(
        feed.recv().await.unwrap(),
        ChangeEvent::TicketRescheduled {
            ticket_id: ticket.id,
            scheduled_date: ymd(2024, 3, 13)
        }
    );
    let stored = store.load_items().await.unwrap();
    assert_eq!(stored[0].as_ticket().map(|t| t.scheduled_date), Some(ymd(2024, 3, 13)));
}

#[tokio::test]
async fn failed_write_notifies_once_and_skips_callback() {
    let window = TimelineWindow::select(Granularity::Week, ymd(2024, 3, 15), &ScaleConfig::default());
    let ticket = TicketBlock::new("Roof leak", ymd(2024, 3, 12));
    let store = Arc::new(RejectingStore::new());
    let notes = Arc::new(Recorder::default());
    let (calls, callback) = counting_callback();
    let rescheduler = Rescheduler::new(store.clone(), notes.clone()).on_reschedule(callback);

    let DropOutcome::Reschedule(request) = drag_by(&ticket, &window, 80.0) else {
        panic!("drop was cancelled");
    };
    assert_eq!(request.new_date, ymd(2024, 3, 19));

    let outcome = rescheduler.submit(request).await;
    assert!(matches!(outcome, RescheduleOutcome::Failed { ticket_id, .. } if ticket_id == ticket.id));
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    assert_eq!(notes.kinds(), vec![NotificationKind::Failure]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn drop_without_movement_still_writes_the_original_date() {
    for granularity in Granularity::ALL {
        let window = TimelineWindow::select(granularity, ymd(2024, 5, 20), &ScaleConfig::default());
        let ticket = TicketBlock::new("Meter read", ymd(2024, 5, 22));
        let store = Arc::new(MemoryStore::new(vec![TimelineItem::from(ticket.clone())]));
        let notes = Arc::new(Recorder::default());
        let rescheduler = Rescheduler::new(store, notes.clone());

        let DropOutcome::Reschedule(request) = drag_by(&ticket, &window, 0.0) else {
            panic!("drop was cancelled");
        };
        assert_eq!(request.new_date, ticket.scheduled_date, "{granularity:?}");
        assert!(matches!(rescheduler.submit(request).await, RescheduleOutcome::Rescheduled { .. }));
        assert_eq!(notes.kinds(), vec![NotificationKind::Success]);
    }
}

#[tokio::test]
async fn unknown_ticket_is_a_failure() {
    let store = Arc::new(MemoryStore::default());
    let notes = Arc::new(Recorder::default());
    let (calls, callback) = counting_callback();
    let rescheduler = Rescheduler::new(store, notes.clone()).on_reschedule(callback);
    let request = dispatch_timeline::model::RescheduleRequest {
        ticket_id: Uuid::new_v4(),
        new_date: ymd(2024, 1, 1),
    };

    assert!(matches!(rescheduler.submit(request).await, RescheduleOutcome::Failed { .. }));
    assert_eq!(notes.kinds(), vec![NotificationKind::Failure]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cancelled_drag_issues_nothing() {
    let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
    let ticket = TicketBlock::new("Gate repair", ymd(2024, 3, 3));
    let mut drag = DragController::default();
    drag.begin(&ticket, 300.0, 290.0, &window).unwrap();
    assert_eq!(drag.cancel(), DropOutcome::Cancelled);
    assert!(!drag.is_dragging());
}

#[tokio::test]
async fn out_of_window_ticket_keeps_its_date_on_a_still_drop() {
    let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
    let ticket = TicketBlock::new("Carry-over", ymd(2024, 2, 20));
    let store = Arc::new(MemoryStore::new(vec![TimelineItem::from(ticket.clone())]));
    let geometry = TimelineGeometry::default();
    let block_left = geometry.content_left(0.0) + window.to_offset(ticket.scheduled_date);

    let mut drag = DragController::new(geometry);
    assert!(drag.begin(&ticket, block_left + 4.0, block_left, &window).is_err());
    assert_eq!(drag.drop_at(block_left + 4.0, 0.0, &window), DropOutcome::Cancelled);

    let stored = store.load_items().await.unwrap();
    assert_eq!(stored[0].as_ticket().map(|t| t.scheduled_date), Some(ymd(2024, 2, 20)));
}

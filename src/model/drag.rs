//! Drag-to-reschedule state machine.
//!
//! `Idle -> Dragging -> (Dropped | Cancelled) -> Idle`. The controller only
//! decides *what* to write; [`crate::reschedule::Rescheduler`] writes it.

use chrono::NaiveDate;
use uuid::Uuid;

use super::item::TicketBlock;
use super::layout::TimelineGeometry;
use super::timeline::TimelineWindow;
use crate::error::DragError;

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub ticket_id: Uuid,
    pub original_date: NaiveDate,
    /// Pointer distance from the block's left edge at grab time.
    pub grab_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// A single scheduled-date write for one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub ticket_id: Uuid,
    pub new_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Reschedule(RescheduleRequest),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    geometry: TimelineGeometry,
}

impl DragController {
    pub fn new(geometry: TimelineGeometry) -> Self {
        Self {
            state: DragState::Idle,
            geometry,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn geometry(&self) -> TimelineGeometry {
        self.geometry
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The session for `ticket_id`, if that ticket is the one being dragged.
    pub fn session_for(&self, ticket_id: Uuid) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) if session.ticket_id == ticket_id => Some(session),
            _ => None,
        }
    }

    /// Start dragging `ticket`. `block_screen_left` is the block's left edge
    /// in the same coordinate space as `pointer_x`.
    ///
    /// Tickets dated outside `window` can't be dragged: their block sits at
    /// an offset the drop clamp would pull back inside, rewriting the date.
    pub fn begin(
        &mut self,
        ticket: &TicketBlock,
        pointer_x: f32,
        block_screen_left: f32,
        window: &TimelineWindow,
    ) -> Result<(), DragError> {
        if let DragState::Dragging(active) = &self.state {
            return Err(DragError::AlreadyDragging(active.ticket_id));
        }
        if !window.contains(ticket.scheduled_date) {
            return Err(DragError::OutsideWindow {
                ticket: ticket.id,
                date: ticket.scheduled_date,
            });
        }
        let session = DragSession {
            ticket_id: ticket.id,
            original_date: ticket.scheduled_date,
            grab_offset: pointer_x - block_screen_left,
        };
        tracing::debug!(ticket = %ticket.id, grab_offset = session.grab_offset, "drag started");
        self.state = DragState::Dragging(session);
        Ok(())
    }

    /// Pixel offset the block's left edge would land on if released now.
    pub fn drop_offset(&self, pointer_x: f32, surface_left: f32, window: &TimelineWindow) -> Option<f32> {
        match &self.state {
            DragState::Dragging(session) => {
                let raw = pointer_x - self.geometry.content_left(surface_left) - session.grab_offset;
                Some(window.clamp_offset(raw))
            }
            DragState::Idle => None,
        }
    }

    /// Release over the drop surface. Always returns to `Idle`.
    ///
    /// A drop at the grab position still yields a request, carrying the
    /// ticket's original date.
    pub fn drop_at(&mut self, pointer_x: f32, surface_left: f32, window: &TimelineWindow) -> DropOutcome {
        let offset = self.drop_offset(pointer_x, surface_left, window);
        let state = std::mem::take(&mut self.state);
        match (state, offset) {
            (DragState::Dragging(session), Some(offset)) => {
                let new_date = window.to_date(offset);
                tracing::debug!(
                    ticket = %session.ticket_id,
                    offset,
                    from = %session.original_date,
                    to = %new_date,
                    "drag dropped"
                );
                DropOutcome::Reschedule(RescheduleRequest {
                    ticket_id: session.ticket_id,
                    new_date,
                })
            }
            _ => DropOutcome::Cancelled,
        }
    }

    /// Release outside the surface or drag end without a drop.
    pub fn cancel(&mut self) -> DropOutcome {
        if let DragState::Dragging(session) = std::mem::take(&mut self.state) {
            tracing::debug!(ticket = %session.ticket_id, "drag cancelled");
        }
        DropOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timeline::{Granularity, ScaleConfig};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn drop_is_relative_to_grab_point() {
        let geometry = TimelineGeometry { label_column_width: 100.0 };
        let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
        let ticket = TicketBlock::new("Pump check", ymd(2024, 3, 5));
        let surface_left = 20.0;
        let block_left = geometry.content_left(surface_left) + window.to_offset(ticket.scheduled_date);

        let mut drag = DragController::new(geometry);
        drag.begin(&ticket, block_left + 10.0, block_left, &window).unwrap();
        // Two columns to the right, same grab point.
        let outcome = drag.drop_at(block_left + 10.0 + 80.0, surface_left, &window);
        assert_eq!(
            outcome,
            DropOutcome::Reschedule(RescheduleRequest {
                ticket_id: ticket.id,
                new_date: ymd(2024, 3, 7),
            })
        );
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn drop_left_of_content_clamps_to_window_start() {
        let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
        let ticket = TicketBlock::new("Filter swap", ymd(2024, 3, 2));
        let mut drag = DragController::default();
        drag.begin(&ticket, 250.0, 240.0, &window).unwrap();
        match drag.drop_at(-500.0, 0.0, &window) {
            DropOutcome::Reschedule(request) => assert_eq!(request.new_date, window.start),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn second_drag_is_refused_while_dragging() {
        let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
        let mut drag = DragController::default();
        let first = TicketBlock::new("a", ymd(2024, 3, 1));
        let second = TicketBlock::new("b", ymd(2024, 3, 2));
        drag.begin(&first, 0.0, 0.0, &window).unwrap();
        assert_eq!(drag.begin(&second, 0.0, 0.0, &window), Err(DragError::AlreadyDragging(first.id)));
        assert!(drag.session_for(first.id).is_some());
    }

    #[test]
    fn cancel_returns_to_idle_and_drop_when_idle_is_cancelled() {
        let window = TimelineWindow::select(Granularity::Week, ymd(2024, 3, 15), &ScaleConfig::default());
        let mut drag = DragController::default();
        let ticket = TicketBlock::new("a", ymd(2024, 3, 1));
        drag.begin(&ticket, 0.0, 0.0, &window).unwrap();
        assert_eq!(drag.cancel(), DropOutcome::Cancelled);
        assert!(!drag.is_dragging());
        assert_eq!(drag.drop_at(10.0, 0.0, &window), DropOutcome::Cancelled);
    }

    #[test]
    fn tickets_outside_the_window_cannot_be_dragged() {
        let geometry = TimelineGeometry::default();
        let window = TimelineWindow::select(Granularity::Day, ymd(2024, 3, 15), &ScaleConfig::default());
        let early = TicketBlock::new("Carry-over", ymd(2024, 2, 20));
        let block_left = geometry.content_left(0.0) + window.to_offset(early.scheduled_date);

        let mut drag = DragController::new(geometry);
        assert_eq!(
            drag.begin(&early, block_left + 5.0, block_left, &window),
            Err(DragError::OutsideWindow {
                ticket: early.id,
                date: ymd(2024, 2, 20),
            })
        );
        // Releasing where it was grabbed must not pull the ticket into March.
        assert_eq!(drag.drop_at(block_left + 5.0, 0.0, &window), DropOutcome::Cancelled);
        assert_eq!(drag.state(), &DragState::Idle);
    }
}

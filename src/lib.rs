//! Dispatch timeline: a zoomable calendar view of project spans,
//! milestones and field-service tickets, with drag-to-reschedule.
//!
//! [`model`] holds the scale selector, the date/offset mapper, layout and
//! the drag state machine. [`store`] is the seam to whatever backend owns
//! the tickets; [`reschedule`] issues the single write a drop produces.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod notify;
pub mod reschedule;
pub mod store;
pub mod ui;

pub use error::{ConfigError, DragError, ExportError, StoreError};

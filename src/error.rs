use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures talking to the ticket store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(Uuid),

    #[error("Update rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the timeline has no lanes")]
    EmptyLayout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    #[error("Ticket {0} is already being dragged")]
    AlreadyDragging(Uuid),

    #[error("Ticket {ticket} is scheduled on {date}, outside the visible window")]
    OutsideWindow { ticket: Uuid, date: NaiveDate },
}

pub mod drag;
pub mod item;
pub mod layout;
pub mod timeline;

pub use drag::{DragController, DragSession, DragState, DropOutcome, RescheduleRequest};
pub use item::{Milestone, MilestoneStatus, ProjectSpan, TicketBlock, TicketStatus, TimelineItem};
pub use layout::{
    ItemRect, ItemShape, Lane, LaneKey, LayoutConfig, Partition, PlacedItem, TimelineGeometry,
    TimelineLayout, ViewMode,
};
pub use timeline::{Granularity, ScaleConfig, ScaleSelector, TimelineWindow};

//! Geometry for everything drawn on the timeline.
//!
//! Layout is pure: it turns a [`TimelineWindow`] and a slice of items into
//! rectangles in content coordinates (x = 0 is the window start). Painting
//! and hit-testing live in the UI; the same rectangles feed the PNG export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{TicketBlock, TimelineItem};
use super::timeline::TimelineWindow;

/// Sizing rules for items that don't derive their width from dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Ticket block width as a share of one column.
    pub ticket_width_fraction: f32,
    /// Ticket blocks never get narrower than this.
    pub ticket_min_width: f32,
    /// Edge length of a milestone diamond's bounding box.
    pub marker_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ticket_width_fraction: 0.8,
            ticket_min_width: 24.0,
            marker_size: 14.0,
        }
    }
}

/// Where the timeline content begins inside the drawing surface.
///
/// Both the chart painter and the drag controller derive the content left
/// edge from this, so they can't disagree about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineGeometry {
    pub label_column_width: f32,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self {
            label_column_width: 180.0,
        }
    }
}

impl TimelineGeometry {
    /// Screen x of content offset 0, given the surface's left edge.
    pub fn content_left(&self, surface_left: f32) -> f32 {
        surface_left + self.label_column_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemShape {
    /// Project duration.
    Bar,
    /// Milestone marker.
    Diamond,
    /// Draggable ticket.
    Block,
}

/// Horizontal extent in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemRect {
    pub left: f32,
    pub width: f32,
}

impl ItemRect {
    pub fn center(&self) -> f32 {
        self.left + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem<'a> {
    pub item: &'a TimelineItem,
    pub shape: ItemShape,
    pub rect: ItemRect,
}

/// Place a single item on the window.
pub fn place<'a>(item: &'a TimelineItem, window: &TimelineWindow, config: &LayoutConfig) -> PlacedItem<'a> {
    let (shape, rect) = match item {
        TimelineItem::ProjectSpan(span) => {
            let left = window.to_offset(span.start_date);
            let right = window.to_offset(span.end_date);
            let width = (right - left).max(window.unit_width);
            (ItemShape::Bar, ItemRect { left, width })
        }
        TimelineItem::Milestone(milestone) => {
            let center = window.to_offset(milestone.due_date);
            (
                ItemShape::Diamond,
                ItemRect {
                    left: center - config.marker_size / 2.0,
                    width: config.marker_size,
                },
            )
        }
        TimelineItem::Ticket(ticket) => (
            ItemShape::Block,
            ItemRect {
                left: window.to_offset(ticket.scheduled_date),
                width: ticket_width(window, config),
            },
        ),
    };
    PlacedItem { item, shape, rect }
}

pub fn ticket_width(window: &TimelineWindow, config: &LayoutConfig) -> f32 {
    (window.unit_width * config.ticket_width_fraction).max(config.ticket_min_width)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LaneKey {
    /// A lane holding a single item (project view, spans and milestones).
    Item(Uuid),
    Agent { id: Uuid, name: String },
    Unassigned,
}

impl LaneKey {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, LaneKey::Unassigned)
    }
}

/// Tickets grouped under one assignee (or none).
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    pub key: LaneKey,
    pub tickets: Vec<&'a TicketBlock>,
}

/// Group tickets by assignee.
///
/// Partitions appear in order of each key's first occurrence, the
/// unassigned partition included. Every ticket lands in exactly one
/// partition, in input order. Non-ticket items are ignored.
pub fn partition_by_assignee<'a, I>(items: I) -> Vec<Partition<'a>>
where
    I: IntoIterator<Item = &'a TimelineItem>,
{
    group_tickets(items)
        .into_iter()
        .map(|(key, grouped)| Partition {
            key,
            tickets: grouped.into_iter().filter_map(TimelineItem::as_ticket).collect(),
        })
        .collect()
}

fn group_tickets<'a, I>(items: I) -> Vec<(LaneKey, Vec<&'a TimelineItem>)>
where
    I: IntoIterator<Item = &'a TimelineItem>,
{
    let mut groups: Vec<(LaneKey, Vec<&'a TimelineItem>)> = Vec::new();
    for item in items {
        let Some(ticket) = item.as_ticket() else {
            continue;
        };
        let position = groups.iter().position(|(key, _)| match (key, ticket.assignee_id) {
            (LaneKey::Agent { id, .. }, Some(assignee)) => *id == assignee,
            (LaneKey::Unassigned, None) => true,
            _ => false,
        });
        match position {
            Some(index) => groups[index].1.push(item),
            None => {
                let key = match ticket.assignee_id {
                    Some(id) => LaneKey::Agent {
                        id,
                        name: ticket
                            .assignee_name
                            .clone()
                            .unwrap_or_else(|| short_id(id)),
                    },
                    None => LaneKey::Unassigned,
                };
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

fn short_id(id: Uuid) -> String {
    let mut s = id.simple().to_string();
    s.truncate(8);
    s
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One lane per item.
    #[default]
    Project,
    /// Spans and milestones first, then one lane per assignee.
    Resource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane<'a> {
    pub key: LaneKey,
    pub title: String,
    pub items: Vec<PlacedItem<'a>>,
}

/// A full render pass worth of geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout<'a> {
    pub window: TimelineWindow,
    pub mode: ViewMode,
    pub lanes: Vec<Lane<'a>>,
    /// Offset of the "today" line.
    pub today: f32,
    pub content_width: f32,
}

impl<'a> TimelineLayout<'a> {
    pub fn compute(
        window: TimelineWindow,
        items: &'a [TimelineItem],
        today: NaiveDate,
        mode: ViewMode,
        config: &LayoutConfig,
    ) -> Self {
        let single = |item: &'a TimelineItem| Lane {
            key: LaneKey::Item(item.id()),
            title: item.label().to_string(),
            items: vec![place(item, &window, config)],
        };

        let lanes = match mode {
            ViewMode::Project => items.iter().map(single).collect(),
            ViewMode::Resource => {
                let mut lanes: Vec<Lane<'a>> = items
                    .iter()
                    .filter(|item| item.as_ticket().is_none())
                    .map(single)
                    .collect();
                for (key, grouped) in group_tickets(items) {
                    let title = match &key {
                        LaneKey::Agent { name, .. } => name.clone(),
                        _ => "Unassigned".to_string(),
                    };
                    lanes.push(Lane {
                        key,
                        title,
                        items: grouped.into_iter().map(|item| place(item, &window, config)).collect(),
                    });
                }
                lanes
            }
        };

        tracing::debug!(
            lanes = lanes.len(),
            items = items.len(),
            granularity = ?window.granularity,
            "computed timeline layout"
        );

        Self {
            window,
            mode,
            lanes,
            today: window.to_offset(today),
            content_width: window.content_width(),
        }
    }

    pub fn today_visible(&self) -> bool {
        (0.0..=self.content_width).contains(&self.today)
    }

    /// All placed tickets, in lane order.
    pub fn tickets(&self) -> impl Iterator<Item = (&PlacedItem<'a>, &'a TicketBlock)> + '_ {
        self.lanes
            .iter()
            .flat_map(|lane| lane.items.iter())
            .filter_map(|placed| placed.item.as_ticket().map(|ticket| (placed, ticket)))
    }
}

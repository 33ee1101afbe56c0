use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a ticket (service call).
///
/// Unrecognised wire values are kept in `Other` so they survive a save.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Open,
    Scheduled,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Scheduled => "scheduled",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::OnHold => "on_hold",
            TicketStatus::Completed => "completed",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::Scheduled => "Scheduled",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::OnHold => "On Hold",
            TicketStatus::Completed => "Completed",
            TicketStatus::Cancelled => "Cancelled",
            TicketStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TicketStatus {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "open" | "new" | "pending" => TicketStatus::Open,
            "scheduled" | "assigned" => TicketStatus::Scheduled,
            "inprogress" | "active" | "started" => TicketStatus::InProgress,
            "onhold" | "hold" | "paused" => TicketStatus::OnHold,
            "completed" | "complete" | "done" | "closed" => TicketStatus::Completed,
            "cancelled" | "canceled" => TicketStatus::Cancelled,
            _ => TicketStatus::Other(raw),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

/// State of a project milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Missed,
    Other(String),
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Missed => "missed",
            MilestoneStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MilestoneStatus::Pending => "Pending",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Completed => "Completed",
            MilestoneStatus::Missed => "Missed",
            MilestoneStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for MilestoneStatus {
    fn from(raw: String) -> Self {
        match normalize(&raw).as_str() {
            "pending" | "planned" | "notstarted" => MilestoneStatus::Pending,
            "inprogress" | "active" => MilestoneStatus::InProgress,
            "completed" | "complete" | "done" => MilestoneStatus::Completed,
            "missed" | "overdue" | "late" => MilestoneStatus::Missed,
            _ => MilestoneStatus::Other(raw),
        }
    }
}

impl From<MilestoneStatus> for String {
    fn from(status: MilestoneStatus) -> Self {
        status.as_str().to_string()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Start/end-dated project bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpan {
    pub id: Uuid,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Single-date, non-draggable marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub label: String,
    pub due_date: NaiveDate,
    pub status: MilestoneStatus,
}

/// A scheduled ticket. The only draggable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketBlock {
    pub id: Uuid,
    pub label: String,
    pub scheduled_date: NaiveDate,
    /// Display only; never used in layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
}

impl TicketBlock {
    pub fn new(label: impl Into<String>, scheduled_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            scheduled_date,
            scheduled_time: None,
            status: TicketStatus::Scheduled,
            assignee_id: None,
            assignee_name: None,
        }
    }

    pub fn assigned_to(mut self, id: Uuid, name: impl Into<String>) -> Self {
        self.assignee_id = Some(id);
        self.assignee_name = Some(name.into());
        self
    }
}

/// Anything that can be placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    ProjectSpan(ProjectSpan),
    Milestone(Milestone),
    Ticket(TicketBlock),
}

impl TimelineItem {
    pub fn span(label: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        TimelineItem::ProjectSpan(ProjectSpan {
            id: Uuid::new_v4(),
            label: label.into(),
            start_date,
            end_date,
        })
    }

    pub fn milestone(label: impl Into<String>, due_date: NaiveDate) -> Self {
        TimelineItem::Milestone(Milestone {
            id: Uuid::new_v4(),
            label: label.into(),
            due_date,
            status: MilestoneStatus::Pending,
        })
    }

    pub fn id(&self) -> Uuid {
        match self {
            TimelineItem::ProjectSpan(span) => span.id,
            TimelineItem::Milestone(milestone) => milestone.id,
            TimelineItem::Ticket(ticket) => ticket.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TimelineItem::ProjectSpan(span) => &span.label,
            TimelineItem::Milestone(milestone) => &milestone.label,
            TimelineItem::Ticket(ticket) => &ticket.label,
        }
    }

    /// Date the item's left edge (or centre, for markers) is placed at.
    pub fn anchor_date(&self) -> NaiveDate {
        match self {
            TimelineItem::ProjectSpan(span) => span.start_date,
            TimelineItem::Milestone(milestone) => milestone.due_date,
            TimelineItem::Ticket(ticket) => ticket.scheduled_date,
        }
    }

    pub fn as_ticket(&self) -> Option<&TicketBlock> {
        match self {
            TimelineItem::Ticket(ticket) => Some(ticket),
            _ => None,
        }
    }
}

impl From<TicketBlock> for TimelineItem {
    fn from(ticket: TicketBlock) -> Self {
        TimelineItem::Ticket(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_status_parses_loosely_and_keeps_unknown_values() {
        assert_eq!(TicketStatus::from("In Progress".to_string()), TicketStatus::InProgress);
        assert_eq!(TicketStatus::from("canceled".to_string()), TicketStatus::Cancelled);
        let odd = TicketStatus::from("awaiting_parts".to_string());
        assert_eq!(odd, TicketStatus::Other("awaiting_parts".to_string()));
        assert_eq!(String::from(odd), "awaiting_parts");
    }

    #[test]
    fn ticket_deserializes_from_iso_dates() {
        let json = r#"{
            "kind": "ticket",
            "id": "6f1c1f7e-2d55-4c1b-9a3e-0d8f6b1b2a10",
            "label": "Boiler service",
            "scheduled_date": "2024-03-06",
            "scheduled_time": "09:30",
            "status": "scheduled"
        }"#;
        let item: TimelineItem = serde_json::from_str(json).unwrap();
        let ticket = item.as_ticket().unwrap();
        assert_eq!(ticket.scheduled_date, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(ticket.status, TicketStatus::Scheduled);
        assert!(ticket.assignee_id.is_none());
    }

    #[test]
    fn malformed_date_is_a_decode_error() {
        let json = r#"{"kind":"milestone","id":"6f1c1f7e-2d55-4c1b-9a3e-0d8f6b1b2a10",
            "label":"Go live","due_date":"2024-02-30","status":"pending"}"#;
        assert!(serde_json::from_str::<TimelineItem>(json).is_err());
    }
}

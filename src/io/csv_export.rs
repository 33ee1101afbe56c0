use std::path::Path;

use crate::error::ExportError;
use crate::model::{TimelineItem, TimelineLayout};

use super::Exporter;

/// Schedule table, semicolon-delimited.
///
/// Columns: Kind ; Label ; Start ; End ; Status ; Assignee
/// Dates are formatted as YYYY-MM-DD. Rows follow lane order.
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, layout: &TimelineLayout<'_>, path: &Path) -> Result<(), ExportError> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        wtr.write_record(["Kind", "Label", "Start", "End", "Status", "Assignee"])?;

        for placed in layout.lanes.iter().flat_map(|lane| lane.items.iter()) {
            let row = match placed.item {
                TimelineItem::ProjectSpan(span) => [
                    "Project".to_string(),
                    span.label.clone(),
                    span.start_date.format("%Y-%m-%d").to_string(),
                    span.end_date.format("%Y-%m-%d").to_string(),
                    String::new(),
                    String::new(),
                ],
                TimelineItem::Milestone(milestone) => {
                    let due = milestone.due_date.format("%Y-%m-%d").to_string();
                    [
                        "Milestone".to_string(),
                        milestone.label.clone(),
                        due.clone(),
                        due,
                        milestone.status.label().to_string(),
                        String::new(),
                    ]
                }
                TimelineItem::Ticket(ticket) => {
                    let date = ticket.scheduled_date.format("%Y-%m-%d").to_string();
                    [
                        "Ticket".to_string(),
                        ticket.label.clone(),
                        date.clone(),
                        date,
                        ticket.status.label().to_string(),
                        ticket.assignee_name.clone().unwrap_or_default(),
                    ]
                }
            };
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

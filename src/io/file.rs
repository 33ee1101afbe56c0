use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::TimelineItem;

/// On-disk board: a name and the items in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(default)]
    pub name: String,
    pub items: Vec<TimelineItem>,
}

/// Same shape, but items are decoded one at a time so a bad one can be skipped.
#[derive(Deserialize)]
struct RawBoard {
    #[serde(default)]
    name: String,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Result of decoding a board.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub name: String,
    pub items: Vec<TimelineItem>,
    /// Items dropped because of malformed dates or an unknown shape.
    pub skipped: usize,
}

/// Decode a board document, skipping items that don't parse.
pub fn decode_board(json: &str) -> Result<LoadReport, StoreError> {
    let raw: RawBoard = serde_json::from_str(json)?;
    let mut items = Vec::with_capacity(raw.items.len());
    let mut skipped = 0usize;
    for (index, value) in raw.items.into_iter().enumerate() {
        match serde_json::from_value::<TimelineItem>(value) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed timeline item");
                skipped += 1;
            }
        }
    }
    Ok(LoadReport {
        name: raw.name,
        items,
        skipped,
    })
}

pub fn encode_board(name: &str, items: &[TimelineItem]) -> Result<String, StoreError> {
    let document = BoardDocument {
        name: name.to_string(),
        items: items.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Save a board to a JSON file.
pub fn save_board(name: &str, items: &[TimelineItem], path: &Path) -> Result<(), StoreError> {
    std::fs::write(path, encode_board(name, items)?)?;
    Ok(())
}

/// Load a board from a JSON file.
pub fn load_board(path: &Path) -> Result<LoadReport, StoreError> {
    let json = std::fs::read_to_string(path)?;
    decode_board(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_items_are_skipped_and_counted() {
        let json = r#"{
            "name": "North depot",
            "items": [
                {"kind": "project_span", "id": "0b7f2c52-9f5e-4d0e-8a51-0f9d5f0c1a11",
                 "label": "Retrofit", "start_date": "2024-03-01", "end_date": "2024-03-20"},
                {"kind": "ticket", "id": "0b7f2c52-9f5e-4d0e-8a51-0f9d5f0c1a12",
                 "label": "Bad date", "scheduled_date": "03/04/2024", "status": "open"},
                {"kind": "invoice", "id": "0b7f2c52-9f5e-4d0e-8a51-0f9d5f0c1a13"}
            ]
        }"#;
        let report = decode_board(json).unwrap();
        assert_eq!(report.name, "North depot");
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn broken_document_is_an_error() {
        assert!(matches!(decode_board("{ not json"), Err(StoreError::Json(_))));
    }
}

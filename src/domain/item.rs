//! Work items flowing from the feed into the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of work (a proposal or an advisory).
///
/// Items carry no identifier; two items with the same fields are the same item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Short human-readable title
    pub title: String,

    /// Free-form description handed to the analysis oracle
    pub description: String,

    /// When the generator produced this item
    #[serde(rename = "timestamp")]
    pub arrival_timestamp: DateTime<Utc>,
}

impl WorkItem {
    /// Create an item stamped with the current time
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::at(title, description, Utc::now())
    }

    /// Create an item with an explicit arrival time
    pub fn at(
        title: impl Into<String>,
        description: impl Into<String>,
        arrival_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            arrival_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_is_named_timestamp() {
        let item = WorkItem::new("Title", "Body");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["title"], "Title");
        assert_eq!(json["description"], "Body");
        assert!(json.get("timestamp").is_some());
        assert!(json.get("arrival_timestamp").is_none());
    }

    #[test]
    fn test_structural_identity() {
        let now = Utc::now();
        let a = WorkItem::at("Same", "Item", now);
        let b = WorkItem::at("Same", "Item", now);
        assert_eq!(a, b);
    }
}

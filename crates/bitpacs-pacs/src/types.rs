//! Orthanc wire types.
//!
//! Orthanc serializes JSON fields in PascalCase; only the fields the
//! portal consumes are modeled, the rest of each object passes through
//! the cache as opaque text.

use serde::{Deserialize, Serialize};

/// Change types that mean "a new exam arrived" and justify a reload.
const RELEVANT_CHANGE_TYPES: [&str; 2] = ["NewStudy", "NewSeries"];

/// Response of `GET /changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangesFeed {
    /// Highest change sequence number known to the server.
    #[serde(default)]
    pub last: u64,
    /// Whether the window reached the end of the feed.
    #[serde(default)]
    pub done: bool,
    /// The change records in this window.
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

impl ChangesFeed {
    /// Whether this window contains at least one new-study/new-series
    /// change, i.e. the listings should be reloaded.
    pub fn has_relevant_change(&self) -> bool {
        self.changes.iter().any(ChangeRecord::is_relevant)
    }
}

/// One record of the Orthanc changes feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeRecord {
    /// The kind of change (`"NewStudy"`, `"StablePatient"`, ...).
    pub change_type: String,
    /// Sequence number of this change.
    #[serde(default)]
    pub seq: u64,
    /// Orthanc resource identifier.
    #[serde(default, rename = "ID")]
    pub id: Option<String>,
    /// Resource path on the Orthanc REST API.
    #[serde(default)]
    pub path: Option<String>,
    /// DICOM level of the resource (`"Study"`, `"Series"`, ...).
    #[serde(default)]
    pub resource_type: Option<String>,
    /// When the change was recorded.
    #[serde(default)]
    pub date: Option<String>,
}

impl ChangeRecord {
    /// Whether this change means a new exam arrived.
    pub fn is_relevant(&self) -> bool {
        RELEVANT_CHANGE_TYPES.contains(&self.change_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Changes": [
            {
                "ChangeType": "NewInstance",
                "Date": "20260829T120412",
                "ID": "8e289db8-2542f4ff-a9a36b1a-3c1ef2f0-380d9514",
                "Path": "/instances/8e289db8-2542f4ff-a9a36b1a-3c1ef2f0-380d9514",
                "ResourceType": "Instance",
                "Seq": 6
            },
            {
                "ChangeType": "NewSeries",
                "Date": "20260829T120412",
                "ID": "cceb768e-e0f8df04-b5dbe88e-8f8f4b37-3d0b4a2e",
                "Path": "/series/cceb768e-e0f8df04-b5dbe88e-8f8f4b37-3d0b4a2e",
                "ResourceType": "Series",
                "Seq": 7
            }
        ],
        "Done": true,
        "Last": 7
    }"#;

    #[test]
    fn test_deserialize_changes_feed() {
        let feed: ChangesFeed = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(feed.last, 7);
        assert!(feed.done);
        assert_eq!(feed.changes.len(), 2);
        assert_eq!(feed.changes[1].change_type, "NewSeries");
        assert_eq!(feed.changes[1].seq, 7);
    }

    #[test]
    fn test_relevance_classification() {
        let feed: ChangesFeed = serde_json::from_str(SAMPLE).unwrap();
        assert!(!feed.changes[0].is_relevant());
        assert!(feed.changes[1].is_relevant());
        assert!(feed.has_relevant_change());
    }

    #[test]
    fn test_irrelevant_batch() {
        let feed = ChangesFeed {
            last: 12,
            done: true,
            changes: vec![ChangeRecord {
                change_type: "StablePatient".to_string(),
                seq: 12,
                id: None,
                path: None,
                resource_type: None,
                date: None,
            }],
        };
        assert!(!feed.has_relevant_change());
    }

    #[test]
    fn test_empty_feed_defaults() {
        let feed: ChangesFeed = serde_json::from_str(r#"{"Last": 0}"#).unwrap();
        assert_eq!(feed.last, 0);
        assert!(feed.changes.is_empty());
    }
}

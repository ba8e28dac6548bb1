//! Memory event model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One recorded reminiscence, attributed to a subject person and a date
///
/// The id is generated at creation and never reused. The creation timestamp
/// is fixed at construction and survives updates: the store replaces content
/// fields on update but retains the stored record's `created_at`.
///
/// The subject is a free display name, not a checked reference into the
/// relationship graph. Renaming a person does not rewrite stored events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// Unique identifier, stable for the record's lifetime
    pub id: String,

    /// Display name of the person this memory is about
    pub subject: String,

    /// Calendar date the memory refers to, chosen by the user. May differ
    /// from the creation timestamp.
    pub date: NaiveDate,

    /// Short title
    pub title: String,

    /// Free-text body
    pub content: String,

    /// Symbolic image name, if the memory references a bundled image
    #[serde(default)]
    pub image_name: Option<String>,

    /// Raw image bytes, if the memory carries its own picture
    #[serde(default)]
    pub image_data: Option<Vec<u8>>,

    /// System clock at insert time, immutable thereafter
    pub created_at: DateTime<Utc>,
}

impl MemoryEvent {
    /// Create a new record with a generated id and the current timestamp
    pub fn new(subject: &str, date: NaiveDate, title: &str, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject: subject.to_string(),
            date,
            title: title.to_string(),
            content: content.to_string(),
            image_name: None,
            image_data: None,
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id with a fixed one (seed data, fixtures)
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Attach a symbolic image name
    pub fn with_image_name(mut self, name: &str) -> Self {
        self.image_name = Some(name.to_string());
        self
    }

    /// Attach raw image bytes
    pub fn with_image_data(mut self, data: Vec<u8>) -> Self {
        self.image_data = Some(data);
        self
    }

    /// Pin the creation timestamp (seed data, fixtures)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_creation() {
        let event = MemoryEvent::new("Mom", date(2024, 3, 1), "Picnic", "At the lake.");
        assert!(!event.id.is_empty());
        assert_eq!(event.subject, "Mom");
        assert_eq!(event.title, "Picnic");
        assert!(event.image_name.is_none());
        assert!(event.image_data.is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MemoryEvent::new("Mom", date(2024, 3, 1), "a", "");
        let b = MemoryEvent::new("Mom", date(2024, 3, 1), "b", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_round_trip() {
        let event = MemoryEvent::new("Dad", date(2023, 12, 24), "Tree", "Decorating.")
            .with_id("evt-1")
            .with_image_name("tree")
            .with_image_data(vec![1, 2, 3]);

        let json = serde_json::to_string(&event).unwrap();
        let decoded: MemoryEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_decode_tolerates_missing_optional_fields() {
        // A payload written before the image fields existed still decodes.
        let json = r#"{
            "id": "evt-legacy",
            "subject": "Mom",
            "date": "2024-01-10",
            "title": "Old",
            "content": "",
            "created_at": "2024-01-10T09:00:00Z"
        }"#;
        let decoded: MemoryEvent = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.id, "evt-legacy");
        assert!(decoded.image_name.is_none());
    }
}

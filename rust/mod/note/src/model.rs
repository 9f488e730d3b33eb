use serde::{Deserialize, Serialize};

/// Field names in the order they are rendered in a collection listing.
pub const NOTE_FIELDS: [&str; 6] = ["id", "title", "description", "created_at", "created_by", "priority"];

/// The client-visible properties of a note, in render order.
pub const NOTE_PROPERTIES: [&str; 5] = ["title", "description", "created_at", "created_by", "priority"];

/// A single row of the `notes` table.
///
/// `id` is assigned by storage on insert and is `None` until then.
/// All other fields are replaced together on update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    #[serde(skip_deserializing)]
    pub id: Option<i64>,

    pub title: String,

    pub description: String,

    /// Timestamp as supplied by the client; stored verbatim.
    pub created_at: String,

    pub created_by: String,

    pub priority: i64,
}

impl Note {
    /// A note that has not been persisted yet.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: impl Into<String>,
        created_by: impl Into<String>,
        priority: i64,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            created_at: created_at.into(),
            created_by: created_by.into(),
            priority,
        }
    }

    /// Build an unpersisted note from a JSON object carrying the five
    /// mutable fields. Any `id` in the input is ignored, whatever its type.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Render as a JSON object with fields in [`NOTE_FIELDS`] order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "created_at": self.created_at,
            "created_by": self.created_by,
            "priority": self.priority,
        })
    }

    /// Render the single-note body: the five properties in
    /// [`NOTE_PROPERTIES`] order, without the id.
    pub fn render(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "created_at": self.created_at,
            "created_by": self.created_by,
            "priority": self.priority,
        })
    }

    /// Copy every mutable field from `other`, keeping this note's id.
    pub fn replace_fields(&mut self, other: Note) {
        self.title = other.title;
        self.description = other.description;
        self.created_at = other.created_at;
        self.created_by = other.created_by;
        self.priority = other.priority;
    }
}

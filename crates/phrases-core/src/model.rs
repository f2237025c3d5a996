use serde::{Deserialize, Serialize};

/// One entry of the collection, flattened from the external page shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Result of a soft delete. Carries the id only, never the full record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archived {
    pub id: String,
    pub archived: bool,
}

impl Archived {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            archived: true,
        }
    }
}

pub const DEFAULT_TITLE_FIELD: &str = "Frase ";
pub const DEFAULT_DATE_FIELD: &str = "fecha";

/// Property names used against the external database schema.
///
/// The defaults mirror the schema the collection was first created with,
/// trailing space included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMap {
    pub title: String,
    pub date: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_FIELD.to_string(),
            date: DEFAULT_DATE_FIELD.to_string(),
        }
    }
}

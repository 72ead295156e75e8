use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached AI summary of a single link. Never mutated: regenerating a
/// summary writes a new row with a fresh timestamp and the newest row
/// wins for context-building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub link_id: String,
    pub kind: SummaryKind,
    /// Instruction text for `SummaryKind::Custom`, verbatim.
    pub prompt: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(
        link_id: impl Into<String>,
        kind: SummaryKind,
        prompt: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            link_id: link_id.into(),
            kind,
            prompt,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// Cached extracted page text, stored as-is without an LLM call.
    Raw,
    Tldr,
    Bullets,
    Quotes,
    Insights,
    Custom,
}

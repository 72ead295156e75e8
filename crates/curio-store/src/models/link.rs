use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved research link with its user-supplied metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub board_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            title: None,
            description: None,
            labels: Vec::new(),
            notes: None,
            priority: None,
            board_id: None,
            created_at: Utc::now(),
        }
    }

    /// Display name: title when present, URL otherwise.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// Declaration order doubles as the fixed tie-break preference when
/// suggestion votes are even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A link being captured but not yet saved; input to the suggestion
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Draft {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

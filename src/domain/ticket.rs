use serde::{Deserialize, Serialize};

use crate::domain::document::Body;
use crate::domain::user::UserReference;

pub const SUBTASK_ISSUE_TYPE: &str = "Sub-task";

/// Trims and uppercases a user-entered ticket key.
pub fn normalize_key(query: &str) -> String {
    query.trim().to_uppercase()
}

/// Project prefix of a `PROJECT-NUMBER` key.
pub fn project_of(key: &str) -> &str {
    key.split('-').next().unwrap_or(key)
}

/// Lightweight ticket as returned by list queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TicketSummary {
    pub fn issue_type_or_default(&self) -> &str {
        self.issue_type.as_deref().unwrap_or("Task")
    }

    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or("Open")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    Name(String),
    User(UserReference),
}

impl Assignee {
    pub fn display_name(&self) -> &str {
        match self {
            Assignee::Name(name) => name,
            Assignee::User(user) => user.name(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubtaskRef {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: Option<SubtaskFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubtaskFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<StatusField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusField {
    pub name: String,
}

impl SubtaskRef {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn summary(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|fields| fields.summary.as_deref())
            .unwrap_or("No Summary")
    }

    pub fn status(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|fields| fields.status.as_ref())
            .map(|status| status.name.as_str())
            .unwrap_or("Open")
    }

    /// List entry for this sub-task. Sub-tasks without a key have no
    /// identity to cache under and yield `None`.
    pub fn to_summary(&self) -> Option<TicketSummary> {
        let key = self.key.as_deref().map(str::trim).filter(|key| !key.is_empty())?;
        Some(TicketSummary {
            key: key.to_string(),
            summary: self.summary().to_string(),
            status: Some(self.status().to_string()),
            issue_type: Some(SUBTASK_ISSUE_TYPE.to_string()),
            assignee: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<Body>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskRef>,
}

impl Ticket {
    pub fn project_key(&self) -> &str {
        project_of(&self.key)
    }

    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(Assignee::display_name)
            .unwrap_or("Unassigned")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

use crate::domain::ticket::TicketSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Recent,
    Assigned,
    Todo,
    Progress,
    Done,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::Recent,
        StatusFilter::Assigned,
        StatusFilter::Todo,
        StatusFilter::Progress,
        StatusFilter::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Recent => "recent",
            StatusFilter::Assigned => "assigned",
            StatusFilter::Todo => "todo",
            StatusFilter::Progress => "progress",
            StatusFilter::Done => "done",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "recent" => Some(StatusFilter::Recent),
            "assigned" => Some(StatusFilter::Assigned),
            "todo" => Some(StatusFilter::Todo),
            "progress" => Some(StatusFilter::Progress),
            "done" => Some(StatusFilter::Done),
            _ => None,
        }
    }

    /// Tracker query predicate issued for this filter.
    pub fn query(&self) -> &'static str {
        match self {
            StatusFilter::Recent => {
                r#"project is not empty AND statusCategory != "Done" ORDER BY created DESC"#
            }
            StatusFilter::Assigned => {
                r#"assignee = currentUser() AND statusCategory != "Done" ORDER BY updated DESC"#
            }
            StatusFilter::Todo => r#"statusCategory = "To Do" ORDER BY created DESC"#,
            StatusFilter::Progress => r#"statusCategory = "In Progress" ORDER BY updated DESC"#,
            StatusFilter::Done => r#"statusCategory = "Done" ORDER BY updated DESC"#,
        }
    }
}

/// Issue-type filter applied locally to the last fetched list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Task,
    Bug,
    Story,
    Epic,
    Other(String),
}

impl TypeFilter {
    pub fn as_str(&self) -> &str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Task => "task",
            TypeFilter::Bug => "bug",
            TypeFilter::Story => "story",
            TypeFilter::Epic => "epic",
            TypeFilter::Other(name) => name,
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => TypeFilter::All,
            "task" => TypeFilter::Task,
            "bug" => TypeFilter::Bug,
            "story" => TypeFilter::Story,
            "epic" => TypeFilter::Epic,
            other => TypeFilter::Other(other.to_string()),
        }
    }

    pub fn matches(&self, issue_type: Option<&str>) -> bool {
        let issue_type = issue_type.unwrap_or_default().trim().to_lowercase();
        match self {
            TypeFilter::All => true,
            // Sub-tasks are a kind of task.
            TypeFilter::Task => matches!(issue_type.as_str(), "task" | "sub-task" | "subtask"),
            other => issue_type == other.as_str(),
        }
    }
}

/// Returns the tickets whose issue type passes `filter`, in their original order.
pub fn filter_by_type(tickets: &[TicketSummary], filter: &TypeFilter) -> Vec<TicketSummary> {
    tickets
        .iter()
        .filter(|ticket| filter.matches(ticket.issue_type.as_deref()))
        .cloned()
        .collect()
}

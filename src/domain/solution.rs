use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolutionDraft {
    pub solution: String,
}

/// Artifacts created when a reviewed solution is published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PublishOutcome {
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub created_subtask_keys: Vec<String>,
    #[serde(default)]
    pub subtask_errors: Vec<String>,
    #[serde(default)]
    pub description_updated: bool,
}

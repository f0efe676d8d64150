use serde::Serialize;

/// Parameters collected by the confirmation step before a GitHub flow runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GithubFlowParams {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl GithubFlowParams {
    /// Drops blank optional fields so they are omitted from the request.
    pub fn normalized(&self) -> Self {
        fn non_blank(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        }

        Self {
            language: self.language.trim().to_string(),
            repo_url: non_blank(&self.repo_url),
            base_branch: non_blank(&self.base_branch),
            question: non_blank(&self.question),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubFlowOutcome {
    pub status: String,
    pub branch: String,
    pub output: Option<String>,
    pub linked_comment_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalLinkStatus {
    pub linked_url: Option<String>,
}

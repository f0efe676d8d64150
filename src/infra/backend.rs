use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, StatusCode, Url,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::comment::Comment;
use crate::domain::filter::StatusFilter;
use crate::domain::github::{ExternalLinkStatus, GithubFlowOutcome, GithubFlowParams};
use crate::domain::solution::{PublishOutcome, SolutionDraft};
use crate::domain::ticket::{Ticket, TicketDraft, TicketSummary};
use crate::error::{AppError, AppResult};
use crate::services::TicketService;

/// HTTP client for the ticket backend.
pub struct BackendClient {
    http: Client,
    base_url: Url,
    page_size: u32,
}

impl BackendClient {
    pub fn new(base_url: &str, page_size: u32) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|err| {
            AppError::Configuration(format!("invalid backend URL '{base_url}': {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "backend URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            page_size,
        })
    }

    /// Appends percent-encoded path segments to the base URL, so a ticket
    /// key can never introduce extra path components.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> AppResult<String> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "backend request failed");
                AppError::Service(format!("{fallback}: {err}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        if !status.is_success() {
            tracing::debug!(%status, body = %body, "backend returned an error");
            return Err(error_from_response(status, &body, fallback));
        }
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> AppResult<T> {
        let body = self.send(request, fallback).await?;
        parse_body(&body, fallback)
    }

    fn post_json<B: Serialize>(&self, segments: &[&str], body: &B) -> RequestBuilder {
        self.http
            .post(self.endpoint(segments))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
    }
}

/// Maps a non-success response to an error, preferring the backend's
/// `detail` message over `fallback`.
fn error_from_response(status: StatusCode, body: &str, fallback: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| match detail {
            Value::String(message) => message,
            other => other.to_string(),
        })
        .filter(|message| !message.trim().is_empty());

    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(detail.unwrap_or_else(|| format!("{fallback}: {status}")))
    } else {
        AppError::Service(detail.unwrap_or_else(|| fallback.to_string()))
    }
}

/// Parses a response body without serde_json's nesting limit. Document trees
/// can be arbitrarily deep; the stack grows on demand instead.
fn parse_body<T: DeserializeOwned>(body: &str, fallback: &str) -> AppResult<T> {
    let unexpected = |err: serde_json::Error| {
        AppError::Service(format!("{fallback}: unexpected response ({err})"))
    };

    let mut json = serde_json::Deserializer::from_str(body);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json)).map_err(unexpected)?;
    json.end().map_err(unexpected)?;
    Ok(value)
}

#[async_trait]
impl TicketService for BackendClient {
    async fn list_tickets(&self, filter: StatusFilter) -> AppResult<Vec<TicketSummary>> {
        let request = self.http.get(self.endpoint(&["tickets"])).query(&[
            ("max_results", self.page_size.to_string()),
            ("jql", filter.query().to_string()),
        ]);
        self.fetch(request, "Failed to fetch tickets").await
    }

    async fn get_ticket(&self, key: &str) -> AppResult<Ticket> {
        let request = self.http.get(self.endpoint(&["tickets", key]));
        self.fetch(request, "Ticket not found or backend error").await
    }

    async fn create_ticket(&self, project_key: &str, draft: &TicketDraft) -> AppResult<String> {
        let request = self.post_json(
            &["tickets"],
            &CreateTicketRequest {
                project_key,
                summary: &draft.summary,
                description: &draft.description,
            },
        );
        let created: CreatedTicket = self.fetch(request, "Failed to create ticket").await?;
        tracing::info!(ticket = %created.key, "ticket created");
        Ok(created.key)
    }

    async fn update_ticket(&self, key: &str, draft: &TicketDraft) -> AppResult<()> {
        let request = self
            .http
            .put(self.endpoint(&["tickets", key]))
            .header(CONTENT_TYPE, "application/json")
            .json(draft);
        self.send(request, "Failed to update ticket").await?;
        tracing::info!(ticket = %key, "ticket updated");
        Ok(())
    }

    async fn list_comments(&self, key: &str) -> AppResult<Vec<Comment>> {
        let request = self.http.get(self.endpoint(&["tickets", key, "comments"]));
        let page: CommentsPage = self.fetch(request, "Failed to load comments").await?;
        Ok(page.comments)
    }

    async fn post_comment(&self, key: &str, body: &str) -> AppResult<()> {
        let request = self.post_json(&["tickets", key, "comments"], &CommentRequest { body });
        self.send(request, "Failed to post comment").await?;
        Ok(())
    }

    async fn generate_solution_draft(&self, key: &str, question: &str) -> AppResult<SolutionDraft> {
        let request = self.post_json(&["tickets", key, "solution"], &SolutionRequest { question });
        self.fetch(request, "Failed to generate solution").await
    }

    async fn publish_solution(&self, key: &str, solution: &str) -> AppResult<PublishOutcome> {
        let request = self.post_json(
            &["tickets", key, "solution", "publish"],
            &PublishRequest { solution },
        );
        let outcome: PublishOutcome = self.fetch(request, "Failed to publish solution").await?;
        tracing::info!(
            ticket = %key,
            comment_id = outcome.comment_id.as_deref().unwrap_or("-"),
            subtasks = outcome.created_subtask_keys.len(),
            "solution published"
        );
        Ok(outcome)
    }

    async fn external_link_status(&self, key: &str) -> AppResult<ExternalLinkStatus> {
        let request = self.http.get(self.endpoint(&["tickets", key, "pr"]));
        let status: PullRequestStatus = self
            .fetch(request, "Failed to check pull request status")
            .await?;
        Ok(status.into())
    }

    async fn run_github_flow(
        &self,
        key: &str,
        params: &GithubFlowParams,
    ) -> AppResult<GithubFlowOutcome> {
        let request = self.post_json(&["tickets", key, "github-flow"], params);
        let response: GithubFlowResponse = self.fetch(request, "GitHub flow failed").await?;
        tracing::info!(
            ticket = %key,
            branch = %response.branch,
            success = response.success,
            "GitHub flow finished"
        );
        Ok(response.into())
    }

    async fn generate_ticket_draft(
        &self,
        prompt: &str,
        existing_key: Option<&str>,
    ) -> AppResult<TicketDraft> {
        let request = self.post_json(
            &["tickets", "draft"],
            &DraftRequest {
                prompt,
                existing_ticket_id: existing_key,
            },
        );
        self.fetch(request, "Failed to generate draft").await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Serialize)]
struct CreateTicketRequest<'a> {
    project_key: &'a str,
    summary: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedTicket {
    key: String,
}

#[derive(Deserialize)]
struct CommentsPage {
    #[serde(default)]
    comments: Vec<Comment>,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct SolutionRequest<'a> {
    question: &'a str,
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    solution: &'a str,
}

#[derive(Serialize)]
struct DraftRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    existing_ticket_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct PullRequestStatus {
    #[serde(default)]
    pr_url: Option<String>,
}

impl From<PullRequestStatus> for ExternalLinkStatus {
    fn from(status: PullRequestStatus) -> Self {
        Self {
            linked_url: status.pr_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct GithubFlowResponse {
    #[serde(default)]
    branch: String,
    #[serde(default)]
    pr_url: Option<String>,
    #[serde(default)]
    jira_comment_id: Option<String>,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl From<GithubFlowResponse> for GithubFlowOutcome {
    fn from(response: GithubFlowResponse) -> Self {
        let status = if response.success { "success" } else { "partial" };
        Self {
            status: status.to_string(),
            branch: response.branch,
            output: response.pr_url.or(response.error),
            linked_comment_id: response.jira_comment_id,
        }
    }
}

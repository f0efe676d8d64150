//! In-memory ticket backend for workflow tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::comment::Comment;
use crate::domain::filter::StatusFilter;
use crate::domain::github::{ExternalLinkStatus, GithubFlowOutcome, GithubFlowParams};
use crate::domain::solution::{PublishOutcome, SolutionDraft};
use crate::domain::ticket::{Ticket, TicketDraft, TicketSummary};
use crate::error::{AppError, AppResult};
use crate::services::TicketService;

/// A recorded service call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

/// Mock implementation of [`TicketService`].
///
/// Responses are configured per method; failures and delays are keyed by
/// method name and apply to the next call only (failures) or every call
/// (delays).
#[derive(Debug, Default)]
pub struct MockTicketService {
    list: RwLock<Vec<TicketSummary>>,
    tickets: RwLock<HashMap<String, Ticket>>,
    comments: RwLock<HashMap<String, Vec<Comment>>>,
    links: RwLock<HashMap<String, String>>,
    solution: RwLock<String>,
    publish_outcome: RwLock<PublishOutcome>,
    github_outcome: RwLock<Option<GithubFlowOutcome>>,
    ticket_draft: RwLock<TicketDraft>,
    created_key: RwLock<String>,
    calls: RwLock<Vec<RecordedCall>>,
    failures: RwLock<HashMap<&'static str, AppError>>,
    delays: RwLock<HashMap<&'static str, Duration>>,
}

impl MockTicketService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_list(&self, tickets: Vec<TicketSummary>) {
        *self.list.write().await = tickets;
    }

    pub async fn add_ticket(&self, ticket: Ticket) {
        self.tickets.write().await.insert(ticket.key.clone(), ticket);
    }

    pub async fn set_comments(&self, key: &str, comments: Vec<Comment>) {
        self.comments.write().await.insert(key.to_string(), comments);
    }

    pub async fn set_link(&self, key: &str, url: &str) {
        self.links
            .write()
            .await
            .insert(key.to_string(), url.to_string());
    }

    pub async fn set_solution(&self, solution: &str) {
        *self.solution.write().await = solution.to_string();
    }

    pub async fn set_publish_outcome(&self, outcome: PublishOutcome) {
        *self.publish_outcome.write().await = outcome;
    }

    pub async fn set_github_outcome(&self, outcome: GithubFlowOutcome) {
        *self.github_outcome.write().await = Some(outcome);
    }

    pub async fn set_ticket_draft(&self, draft: TicketDraft) {
        *self.ticket_draft.write().await = draft;
    }

    pub async fn set_created_key(&self, key: &str) {
        *self.created_key.write().await = key.to_string();
    }

    /// Configure the next call to `method` to fail with `error`.
    pub async fn fail_next(&self, method: &'static str, error: AppError) {
        self.failures.write().await.insert(method, error);
    }

    /// Delay every call to `method`.
    pub async fn set_delay(&self, method: &'static str, delay: Duration) {
        self.delays.write().await.insert(method, delay);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self, method: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    async fn enter(&self, method: &'static str, args: &[&str]) -> AppResult<()> {
        self.calls.write().await.push(RecordedCall {
            method,
            args: args.iter().map(|arg| arg.to_string()).collect(),
        });

        let delay = self.delays.read().await.get(method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.write().await.remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TicketService for MockTicketService {
    async fn list_tickets(&self, filter: StatusFilter) -> AppResult<Vec<TicketSummary>> {
        self.enter("list_tickets", &[filter.as_str()]).await?;
        Ok(self.list.read().await.clone())
    }

    async fn get_ticket(&self, key: &str) -> AppResult<Ticket> {
        self.enter("get_ticket", &[key]).await?;
        self.tickets
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Ticket not found or error: 404".to_string()))
    }

    async fn create_ticket(&self, project_key: &str, draft: &TicketDraft) -> AppResult<String> {
        self.enter("create_ticket", &[project_key, draft.summary.as_str()])
            .await?;
        Ok(self.created_key.read().await.clone())
    }

    async fn update_ticket(&self, key: &str, draft: &TicketDraft) -> AppResult<()> {
        self.enter("update_ticket", &[key, draft.summary.as_str()]).await
    }

    async fn list_comments(&self, key: &str) -> AppResult<Vec<Comment>> {
        self.enter("list_comments", &[key]).await?;
        Ok(self
            .comments
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn post_comment(&self, key: &str, body: &str) -> AppResult<()> {
        self.enter("post_comment", &[key, body]).await
    }

    async fn generate_solution_draft(&self, key: &str, question: &str) -> AppResult<SolutionDraft> {
        self.enter("generate_solution_draft", &[key, question])
            .await?;
        Ok(SolutionDraft {
            solution: self.solution.read().await.clone(),
        })
    }

    async fn publish_solution(&self, key: &str, solution: &str) -> AppResult<PublishOutcome> {
        self.enter("publish_solution", &[key, solution]).await?;
        Ok(self.publish_outcome.read().await.clone())
    }

    async fn external_link_status(&self, key: &str) -> AppResult<ExternalLinkStatus> {
        self.enter("external_link_status", &[key]).await?;
        Ok(ExternalLinkStatus {
            linked_url: self.links.read().await.get(key).cloned(),
        })
    }

    async fn run_github_flow(
        &self,
        key: &str,
        params: &GithubFlowParams,
    ) -> AppResult<GithubFlowOutcome> {
        self.enter("run_github_flow", &[key, params.language.as_str()])
            .await?;
        self.github_outcome
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::Service("GitHub flow failed".to_string()))
    }

    async fn generate_ticket_draft(
        &self,
        prompt: &str,
        existing_key: Option<&str>,
    ) -> AppResult<TicketDraft> {
        self.enter(
            "generate_ticket_draft",
            &[prompt, existing_key.unwrap_or_default()],
        )
        .await?;
        Ok(self.ticket_draft.read().await.clone())
    }
}

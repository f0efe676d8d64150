use async_trait::async_trait;

use crate::domain::comment::Comment;
use crate::domain::filter::StatusFilter;
use crate::domain::github::{ExternalLinkStatus, GithubFlowOutcome, GithubFlowParams};
use crate::domain::solution::{PublishOutcome, SolutionDraft};
use crate::domain::ticket::{Ticket, TicketDraft, TicketSummary};
use crate::error::AppResult;

/// Every data operation the workflow needs from the ticket backend.
#[async_trait]
pub trait TicketService: Send + Sync {
    async fn list_tickets(&self, filter: StatusFilter) -> AppResult<Vec<TicketSummary>>;

    /// Fails with `AppError::NotFound` for unknown keys.
    async fn get_ticket(&self, key: &str) -> AppResult<Ticket>;

    /// Returns the key of the created ticket.
    async fn create_ticket(&self, project_key: &str, draft: &TicketDraft) -> AppResult<String>;

    async fn update_ticket(&self, key: &str, draft: &TicketDraft) -> AppResult<()>;

    async fn list_comments(&self, key: &str) -> AppResult<Vec<Comment>>;

    async fn post_comment(&self, key: &str, body: &str) -> AppResult<()>;

    async fn generate_solution_draft(&self, key: &str, question: &str) -> AppResult<SolutionDraft>;

    async fn publish_solution(&self, key: &str, solution: &str) -> AppResult<PublishOutcome>;

    async fn external_link_status(&self, key: &str) -> AppResult<ExternalLinkStatus>;

    async fn run_github_flow(
        &self,
        key: &str,
        params: &GithubFlowParams,
    ) -> AppResult<GithubFlowOutcome>;

    async fn generate_ticket_draft(
        &self,
        prompt: &str,
        existing_key: Option<&str>,
    ) -> AppResult<TicketDraft>;
}

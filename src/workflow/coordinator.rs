use std::sync::Arc;

use tokio::time::Instant;

use crate::config::WorkflowSettings;
use crate::domain::filter::{StatusFilter, TypeFilter};
use crate::domain::github::GithubFlowParams;
use crate::error::AppResult;
use crate::services::TicketService;
use crate::workflow::session::{DraftMode, DraftSubmission, DraftSubmitted, Notification, Session};

/// Drives a [`Session`] against a [`TicketService`].
///
/// Operations reject with an error only for local rejections (validation or
/// an action that is not currently available). Backend failures are recorded
/// in the session as notifications and the operation still returns `Ok`.
pub struct Coordinator {
    session: Session,
    tickets: Arc<dyn TicketService>,
    settings: WorkflowSettings,
}

enum AfterSubmit {
    RefreshList,
    Reload(String),
}

impl Coordinator {
    pub fn new(tickets: Arc<dyn TicketService>, settings: WorkflowSettings) -> Self {
        Self {
            session: Session::new(),
            tickets,
            settings,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.session.drain_notifications()
    }

    pub async fn load_list(&mut self, filter: Option<StatusFilter>) -> AppResult<()> {
        let filter = self.session.begin_list(filter)?;
        let result = self.tickets.list_tickets(filter).await;
        self.session.finish_list(result);
        Ok(())
    }

    pub fn select_type_filter(&mut self, filter: TypeFilter) {
        self.session.select_type_filter(filter);
    }

    /// Returns to the list, re-querying the current status filter.
    pub async fn back(&mut self) -> AppResult<()> {
        self.load_list(None).await
    }

    /// Looks a ticket up by key. A failed lookup notifies and falls back to a
    /// refreshed list.
    pub async fn search(&mut self, query: &str) -> AppResult<()> {
        let Some(key) = self.session.begin_search(query)? else {
            return Ok(());
        };
        let result = self.tickets.get_ticket(&key).await;
        if self.session.finish_search(&key, result) {
            self.refresh_ticket_panels().await;
            Ok(())
        } else {
            self.load_list(None).await
        }
    }

    pub async fn open_ticket(&mut self, key: &str) -> AppResult<()> {
        self.search(key).await
    }

    /// Loads comments and the external link status for the current ticket.
    async fn refresh_ticket_panels(&mut self) {
        let Some(key) = self.session.begin_comments() else {
            return;
        };
        let (comments, link) = tokio::join!(
            self.tickets.list_comments(&key),
            self.tickets.external_link_status(&key)
        );
        self.session.finish_comments(&key, comments);
        self.session.finish_external_link(&key, link);
    }

    pub async fn refresh_comments(&mut self) {
        let Some(key) = self.session.begin_comments() else {
            return;
        };
        let result = self.tickets.list_comments(&key).await;
        self.session.finish_comments(&key, result);
    }

    async fn check_external_link(&mut self, key: &str) {
        let result = self.tickets.external_link_status(key).await;
        self.session.finish_external_link(key, result);
    }

    pub async fn generate_solution(&mut self) -> AppResult<()> {
        let key = self.session.begin_generate()?;
        let result = self
            .tickets
            .generate_solution_draft(&key, &self.settings.solution_question)
            .await;
        self.session.finish_generate(&key, result);
        Ok(())
    }

    pub fn edit_solution(&mut self, text: &str) -> AppResult<()> {
        self.session.edit_solution(text)
    }

    pub fn cancel_review(&mut self) -> AppResult<()> {
        self.session.cancel_review()
    }

    pub async fn publish_solution(&mut self, edited: &str) -> AppResult<()> {
        let (key, solution) = self.session.begin_publish(edited)?;
        let result = self.tickets.publish_solution(&key, &solution).await;
        self.session.finish_publish(&key, result);
        Ok(())
    }

    /// Confirmation defaults taken from the configuration.
    pub fn github_defaults(&self) -> GithubFlowParams {
        GithubFlowParams {
            language: self.settings.github_language.clone().unwrap_or_default(),
            repo_url: self.settings.github_repo_url.clone(),
            base_branch: self.settings.github_base_branch.clone(),
            question: None,
        }
    }

    pub fn request_github_flow(&mut self) -> AppResult<()> {
        let defaults = self.github_defaults();
        self.session.request_github_flow(defaults)
    }

    pub fn dismiss_github_prompt(&mut self) {
        self.session.dismiss_github_prompt();
    }

    /// Runs the confirmed GitHub flow. The cosmetic stage timers are raced
    /// against the request so the indicator advances while it is pending.
    pub async fn run_github_flow(&mut self, params: GithubFlowParams) -> AppResult<()> {
        let timing = self.settings.progress;
        let (key, params) = self
            .session
            .begin_github_flow(params, Instant::now(), &timing)?;

        let tickets = Arc::clone(&self.tickets);
        let call = tickets.run_github_flow(&key, &params);
        tokio::pin!(call);

        let result = loop {
            let next = self
                .session
                .progress()
                .and_then(|progress| progress.next_timer());
            match next {
                Some((timer, deadline)) => tokio::select! {
                    result = &mut call => break result,
                    _ = tokio::time::sleep_until(deadline) => {
                        self.session.fire_progress_timer(timer);
                    }
                },
                None => break (&mut call).await,
            }
        };

        let succeeded = result.is_ok();
        self.session
            .finish_github_flow(&key, result, Instant::now(), &timing);
        if succeeded {
            self.check_external_link(&key).await;
        }
        Ok(())
    }

    /// Applies timer-driven housekeeping such as hiding the finished
    /// progress indicator.
    pub fn tick(&mut self) {
        self.session.tick(Instant::now());
    }

    pub async fn post_comment(&mut self, body: &str) -> AppResult<()> {
        let (key, body) = self.session.begin_post_comment(body)?;
        let result = self.tickets.post_comment(&key, &body).await;
        if self.session.finish_post_comment(&key, result) {
            self.refresh_comments().await;
        }
        Ok(())
    }

    pub fn open_draft(&mut self, mode: DraftMode, default_project: Option<&str>) -> AppResult<()> {
        self.session.open_draft(mode, default_project)
    }

    pub async fn generate_ticket_draft(&mut self) -> AppResult<()> {
        let Some((prompt, existing)) = self.session.begin_generate_ticket_draft()? else {
            return Ok(());
        };
        let result = self
            .tickets
            .generate_ticket_draft(&prompt, existing.as_deref())
            .await;
        self.session.finish_generate_ticket_draft(result);
        Ok(())
    }

    /// Creates or updates the ticket in the editor. A created ticket
    /// refreshes the list; an updated one is reloaded.
    pub async fn submit_draft(&mut self) -> AppResult<()> {
        let submission = self.session.begin_submit_draft()?;
        let result = match &submission {
            DraftSubmission::Create { project_key, draft } => self
                .tickets
                .create_ticket(project_key, draft)
                .await
                .map(DraftSubmitted::Created),
            DraftSubmission::Update { key, draft } => self
                .tickets
                .update_ticket(key, draft)
                .await
                .map(|()| DraftSubmitted::Updated(key.clone())),
        };

        let after = match &result {
            Ok(DraftSubmitted::Created(_)) => Some(AfterSubmit::RefreshList),
            Ok(DraftSubmitted::Updated(key)) => Some(AfterSubmit::Reload(key.clone())),
            Err(_) => None,
        };
        self.session.finish_submit_draft(result);

        match after {
            Some(AfterSubmit::RefreshList) => self.load_list(None).await,
            Some(AfterSubmit::Reload(key)) => self.open_ticket(&key).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::github::GithubFlowOutcome;
    use crate::domain::solution::PublishOutcome;
    use crate::domain::ticket::{Ticket, TicketDraft, TicketSummary};
    use crate::error::AppError;
    use crate::testing::MockTicketService;
    use crate::workflow::progress::StageStatus;
    use crate::workflow::session::{CommentsPanel, ListStatus, NotificationLevel, WorkflowState};

    fn ticket(key: &str) -> Ticket {
        Ticket {
            key: key.to_string(),
            summary: "Login button broken".to_string(),
            description: None,
            status: Some("In Progress".to_string()),
            issue_type: Some("Bug".to_string()),
            assignee: None,
            subtasks: Vec::new(),
        }
    }

    fn summary(key: &str) -> TicketSummary {
        TicketSummary {
            key: key.to_string(),
            summary: "something".to_string(),
            status: Some("To Do".to_string()),
            issue_type: Some("Task".to_string()),
            assignee: None,
        }
    }

    fn coordinator(mock: &Arc<MockTicketService>) -> Coordinator {
        let tickets: Arc<dyn TicketService> = mock.clone();
        Coordinator::new(tickets, WorkflowSettings::default())
    }

    fn outcome() -> GithubFlowOutcome {
        GithubFlowOutcome {
            status: "success".to_string(),
            branch: "feature/ABC-1".to_string(),
            output: Some("https://github.com/acme/app/pull/12".to_string()),
            linked_comment_id: Some("777".to_string()),
        }
    }

    async fn viewing(mock: &Arc<MockTicketService>, key: &str) -> Coordinator {
        mock.add_ticket(ticket(key)).await;
        let mut coordinator = coordinator(mock);
        coordinator.search(key).await.unwrap();
        coordinator
    }

    #[tokio::test]
    async fn search_loads_ticket_and_panels() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_comments("ABC-1", vec![Default::default()]).await;
        let coordinator = viewing(&mock, "ABC-1").await;

        let current = coordinator.session().current().unwrap();
        assert_eq!(current.ticket.key, "ABC-1");
        assert!(matches!(&current.comments, CommentsPanel::Loaded(c) if c.len() == 1));
        assert_eq!(current.external_link, None);
        assert_eq!(mock.call_count("external_link_status").await, 1);
    }

    #[tokio::test]
    async fn missing_ticket_falls_back_to_list() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_list(vec![summary("ABC-2")]).await;
        let mut coordinator = viewing(&mock, "ABC-1").await;

        coordinator.search("abc-123").await.unwrap();

        let session = coordinator.session();
        assert_eq!(session.state(), &WorkflowState::Listing);
        assert!(session.current().is_none());
        assert_eq!(session.list_status(), &ListStatus::Loaded);
        assert_eq!(session.tickets().len(), 1);

        let notes = coordinator.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].message, "Ticket not found or error: 404");

        let calls = mock.recorded_calls().await;
        let lookup = calls.iter().rfind(|c| c.method == "get_ticket").unwrap();
        assert_eq!(lookup.args, vec!["ABC-123"]);
    }

    #[tokio::test]
    async fn generate_enters_review() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_solution("Step 1...").await;
        let mut coordinator = viewing(&mock, "ABC-1").await;

        coordinator.generate_solution().await.unwrap();

        assert_eq!(
            coordinator.session().state(),
            &WorkflowState::ReviewingSolution {
                draft: "Step 1...".to_string()
            }
        );
        let calls = mock.recorded_calls().await;
        let call = calls
            .iter()
            .find(|c| c.method == "generate_solution_draft")
            .unwrap();
        assert_eq!(call.args[0], "ABC-1");
        assert_eq!(call.args[1], crate::config::DEFAULT_SOLUTION_QUESTION);
    }

    #[tokio::test]
    async fn blank_publish_makes_no_service_call() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_solution("draft").await;
        let mut coordinator = viewing(&mock, "ABC-1").await;
        coordinator.generate_solution().await.unwrap();

        let err = coordinator.publish_solution("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(mock.call_count("publish_solution").await, 0);
        assert!(matches!(
            coordinator.session().state(),
            WorkflowState::ReviewingSolution { .. }
        ));
    }

    #[tokio::test]
    async fn publish_success_returns_to_ticket() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_solution("draft").await;
        mock.set_publish_outcome(PublishOutcome {
            comment_id: Some("10001".to_string()),
            created_subtask_keys: vec!["ABC-7".to_string()],
            ..PublishOutcome::default()
        })
        .await;
        let mut coordinator = viewing(&mock, "ABC-1").await;
        coordinator.generate_solution().await.unwrap();

        coordinator.publish_solution(" edited draft ").await.unwrap();

        assert_eq!(coordinator.session().state(), &WorkflowState::ViewingTicket);
        let calls = mock.recorded_calls().await;
        let publish = calls.iter().find(|c| c.method == "publish_solution").unwrap();
        assert_eq!(publish.args, vec!["ABC-1", "edited draft"]);
    }

    #[tokio::test]
    async fn publish_failure_keeps_draft() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_solution("draft").await;
        let mut coordinator = viewing(&mock, "ABC-1").await;
        coordinator.generate_solution().await.unwrap();
        let unavailable = AppError::Service("Jira unavailable".to_string());
        mock.fail_next("publish_solution", unavailable).await;

        coordinator.publish_solution("my edits").await.unwrap();

        assert_eq!(coordinator.session().solution_draft(), Some("my edits"));
        assert!(coordinator.session().affordances().publish_solution);
    }

    #[tokio::test]
    async fn linked_ticket_blocks_both_actions() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_link("ABC-1", "https://github.com/acme/app/pull/3").await;
        let mut coordinator = viewing(&mock, "ABC-1").await;

        let affordances = coordinator.session().affordances();
        assert!(!affordances.generate_solution.enabled);
        assert!(!affordances.github_flow.enabled);
        assert!(coordinator.generate_solution().await.is_err());
        assert!(coordinator.request_github_flow().is_err());
        assert_eq!(mock.call_count("generate_solution_draft").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn github_flow_advances_stages_then_completes() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_github_outcome(outcome()).await;
        mock.set_delay("run_github_flow", Duration::from_secs(30)).await;
        let mut coordinator = viewing(&mock, "ABC-1").await;

        coordinator.request_github_flow().unwrap();
        let params = GithubFlowParams {
            language: "python".to_string(),
            ..GithubFlowParams::default()
        };
        coordinator.run_github_flow(params).await.unwrap();

        let session = coordinator.session();
        assert_eq!(session.state(), &WorkflowState::ViewingTicket);
        let progress = session.progress().unwrap();
        assert_eq!(progress.stages(), [StageStatus::Done; 3]);
        assert!(!progress.has_pending_timers());
        assert!(session.console().lines.contains(&"Branch: feature/ABC-1".to_string()));

        // The grace delay hides the indicator.
        tokio::time::advance(Duration::from_secs(3)).await;
        coordinator.tick();
        assert!(coordinator.session().progress().is_none());
        // Link status is re-checked after the flow.
        assert_eq!(mock.call_count("external_link_status").await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn github_flow_failure_stops_stage_one() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_delay("run_github_flow", Duration::from_secs(5)).await;
        let mut coordinator = viewing(&mock, "ABC-1").await;
        let missing = AppError::Service("Repo not found".to_string());
        mock.fail_next("run_github_flow", missing).await;

        coordinator.request_github_flow().unwrap();
        let params = GithubFlowParams {
            language: "rust".to_string(),
            ..GithubFlowParams::default()
        };
        coordinator.run_github_flow(params).await.unwrap();

        let progress = coordinator.session().progress().unwrap();
        assert_eq!(
            progress.stages(),
            [StageStatus::Active, StageStatus::Pending, StageStatus::Pending]
        );
        assert!(!progress.has_pending_timers());
        assert_eq!(coordinator.session().state(), &WorkflowState::ViewingTicket);
        assert!(coordinator.session().affordances().github_flow.enabled);

        let notes = coordinator.drain_notifications();
        assert_eq!(notes[0].message, "GitHub flow failed: Repo not found");
    }

    #[tokio::test]
    async fn github_flow_requires_language() {
        let mock = Arc::new(MockTicketService::new());
        let mut coordinator = viewing(&mock, "ABC-1").await;
        coordinator.request_github_flow().unwrap();

        let err = coordinator
            .run_github_flow(GithubFlowParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(mock.call_count("run_github_flow").await, 0);
    }

    #[tokio::test]
    async fn back_discards_review_and_refetches() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_solution("draft").await;
        mock.set_list(vec![summary("ABC-9")]).await;
        let mut coordinator = viewing(&mock, "ABC-1").await;
        coordinator.generate_solution().await.unwrap();
        coordinator.edit_solution("edited").unwrap();
        coordinator.cancel_review().unwrap();
        coordinator.generate_solution().await.unwrap();

        coordinator.back().await.unwrap();

        let session = coordinator.session();
        assert_eq!(session.state(), &WorkflowState::Listing);
        assert!(session.current().is_none());
        assert_eq!(session.solution_draft(), None);
        assert_eq!(session.tickets()[0].key, "ABC-9");
        assert_eq!(mock.call_count("list_tickets").await, 1);
    }

    #[tokio::test]
    async fn posting_comment_refreshes_panel() {
        let mock = Arc::new(MockTicketService::new());
        let mut coordinator = viewing(&mock, "ABC-1").await;

        coordinator.post_comment("Looks good").await.unwrap();

        assert_eq!(mock.call_count("list_comments").await, 2);
        assert!(matches!(
            coordinator.session().current().unwrap().comments,
            CommentsPanel::Loaded(_)
        ));
    }

    #[tokio::test]
    async fn created_ticket_refreshes_list() {
        let mock = Arc::new(MockTicketService::new());
        mock.set_ticket_draft(TicketDraft {
            summary: "Add dark mode".to_string(),
            description: "Users asked for it".to_string(),
        })
        .await;
        mock.set_created_key("WEB-10").await;
        mock.set_list(vec![summary("WEB-10")]).await;
        let mut coordinator = coordinator(&mock);

        coordinator
            .open_draft(DraftMode::Create, Some("WEB"))
            .unwrap();
        coordinator.session_mut().draft_editor_mut().unwrap().prompt = "dark mode".to_string();
        coordinator.generate_ticket_draft().await.unwrap();
        coordinator.submit_draft().await.unwrap();

        assert!(coordinator.session().draft_editor().is_none());
        assert_eq!(coordinator.session().tickets().len(), 1);
        let calls = mock.recorded_calls().await;
        let create = calls.iter().find(|c| c.method == "create_ticket").unwrap();
        assert_eq!(create.args, vec!["WEB", "Add dark mode"]);
    }

    #[tokio::test]
    async fn updated_ticket_is_reloaded() {
        let mock = Arc::new(MockTicketService::new());
        let mut coordinator = viewing(&mock, "ABC-1").await;

        coordinator.open_draft(DraftMode::Update, None).unwrap();
        coordinator.session_mut().draft_editor_mut().unwrap().summary = "Renamed".to_string();
        coordinator.submit_draft().await.unwrap();

        assert_eq!(mock.call_count("update_ticket").await, 1);
        assert_eq!(mock.call_count("get_ticket").await, 2);
        assert_eq!(coordinator.session().current_key(), Some("ABC-1"));
    }
}

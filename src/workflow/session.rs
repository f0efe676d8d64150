//! Owned UI state and the pure transitions between workflow surfaces.
//!
//! Every asynchronous operation is split into a `begin_*` transition, which
//! validates the request against the current state and marks the operation
//! in flight, and a `finish_*` transition that applies the service result.
//! The coordinator performs the actual service call in between.

use std::collections::HashSet;

use tokio::time::Instant;

use crate::cache::TicketListCache;
use crate::config::ProgressTiming;
use crate::domain::comment::Comment;
use crate::domain::filter::{StatusFilter, TypeFilter, filter_by_type};
use crate::domain::github::{ExternalLinkStatus, GithubFlowOutcome, GithubFlowParams};
use crate::domain::solution::{PublishOutcome, SolutionDraft};
use crate::domain::ticket::{SubtaskRef, Ticket, TicketDraft, TicketSummary, normalize_key};
use crate::error::{AppError, AppResult};
use crate::workflow::progress::{GithubFlowProgress, ProgressTimer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Listing,
    ViewingTicket,
    ReviewingSolution { draft: String },
    RunningGithubFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadingList,
    LoadingTicket,
    GeneratingSolution,
    PublishingSolution,
    RunningGithubFlow,
    PostingComment,
    GeneratingTicketDraft,
    SubmittingTicketDraft,
}

impl Operation {
    /// Operations during which the ticket action buttons stay disabled.
    fn blocks_ticket_actions(self) -> bool {
        matches!(
            self,
            Operation::LoadingTicket
                | Operation::GeneratingSolution
                | Operation::PublishingSolution
                | Operation::RunningGithubFlow
        )
    }

    fn describe(self) -> &'static str {
        match self {
            Operation::LoadingList => "ticket list refresh",
            Operation::LoadingTicket => "ticket load",
            Operation::GeneratingSolution => "solution generation",
            Operation::PublishingSolution => "solution publish",
            Operation::RunningGithubFlow => "GitHub flow",
            Operation::PostingComment => "comment post",
            Operation::GeneratingTicketDraft => "ticket draft generation",
            Operation::SubmittingTicketDraft => "ticket draft submission",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Transcript of the current long-running operation.
#[derive(Debug, Clone, Default)]
pub struct Console {
    pub visible: bool,
    pub lines: Vec<String>,
    pub loader: Option<String>,
}

impl Console {
    fn show(&mut self, initial: &str) {
        self.visible = true;
        self.lines = vec![format!("> {initial}")];
        self.loader = None;
    }

    fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn hide(&mut self) {
        self.visible = false;
        self.loader = None;
    }
}

#[derive(Debug, Clone)]
pub enum CommentsPanel {
    Loading,
    Loaded(Vec<Comment>),
    Failed,
}

#[derive(Debug, Clone)]
pub struct CurrentTicket {
    pub ticket: Ticket,
    pub external_link: Option<String>,
    pub comments: CommentsPanel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Update,
}

/// Create / AI-update ticket editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraftEditor {
    pub mode: DraftMode,
    pub prompt: String,
    pub project_key: String,
    pub summary: String,
    pub description: String,
    /// The summary/description fields are shown.
    pub fields_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSubmission {
    Create {
        project_key: String,
        draft: TicketDraft,
    },
    Update {
        key: String,
        draft: TicketDraft,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSubmitted {
    Created(String),
    Updated(String),
}

/// Confirmation step collecting GitHub flow parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubPrompt {
    pub ticket_key: String,
    pub params: GithubFlowParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    pub enabled: bool,
    pub label: &'static str,
}

/// Which controls are enabled for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub generate_solution: Affordance,
    pub github_flow: Affordance,
    pub publish_solution: bool,
    pub cancel_review: bool,
    pub post_comment: bool,
}

#[derive(Debug)]
pub struct Session {
    state: WorkflowState,
    current: Option<CurrentTicket>,
    status_filter: StatusFilter,
    type_filter: TypeFilter,
    tickets: Vec<TicketSummary>,
    list_status: ListStatus,
    cache: TicketListCache,
    in_flight: HashSet<Operation>,
    console: Console,
    notifications: Vec<Notification>,
    progress: Option<GithubFlowProgress>,
    github_prompt: Option<GithubPrompt>,
    draft_editor: Option<TicketDraftEditor>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Listing,
            current: None,
            status_filter: StatusFilter::default(),
            type_filter: TypeFilter::default(),
            tickets: Vec::new(),
            list_status: ListStatus::Idle,
            cache: TicketListCache::new(),
            in_flight: HashSet::new(),
            console: Console::default(),
            notifications: Vec::new(),
            progress: None,
            github_prompt: None,
            draft_editor: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn current(&self) -> Option<&CurrentTicket> {
        self.current.as_ref()
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.as_ref().map(|current| current.ticket.key.as_str())
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn type_filter(&self) -> &TypeFilter {
        &self.type_filter
    }

    /// Last fetched list, before type filtering.
    #[cfg(test)]
    pub fn tickets(&self) -> &[TicketSummary] {
        &self.tickets
    }

    pub fn visible_tickets(&self) -> Vec<TicketSummary> {
        filter_by_type(&self.tickets, &self.type_filter)
    }

    pub fn list_status(&self) -> &ListStatus {
        &self.list_status
    }

    #[cfg(test)]
    pub fn cache(&self) -> &TicketListCache {
        &self.cache
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn progress(&self) -> Option<&GithubFlowProgress> {
        self.progress.as_ref()
    }

    pub fn github_prompt(&self) -> Option<&GithubPrompt> {
        self.github_prompt.as_ref()
    }

    pub fn draft_editor(&self) -> Option<&TicketDraftEditor> {
        self.draft_editor.as_ref()
    }

    pub fn draft_editor_mut(&mut self) -> Option<&mut TicketDraftEditor> {
        self.draft_editor.as_mut()
    }

    pub fn solution_draft(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::ReviewingSolution { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        self.in_flight.contains(&operation)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify_success(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        });
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.notifications.push(Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        });
    }

    /// Validation failures are surfaced to the user; other local rejections
    /// correspond to disabled controls and are only logged.
    fn reject(&mut self, err: AppError) -> AppError {
        match &err {
            AppError::Validation(message) => self.notify_error(message.clone()),
            other => tracing::debug!(reason = %other, "action rejected"),
        }
        err
    }

    fn begin(&mut self, operation: Operation) -> AppResult<()> {
        let conflicting = self.in_flight.contains(&operation)
            || (operation.blocks_ticket_actions()
                && self.in_flight.iter().any(|op| op.blocks_ticket_actions()));
        if conflicting {
            return Err(self.reject(AppError::invalid_state(format!(
                "{} cannot start while another operation is in progress",
                operation.describe()
            ))));
        }
        self.in_flight.insert(operation);
        tracing::debug!(operation = operation.describe(), "operation started");
        Ok(())
    }

    fn end(&mut self, operation: Operation) {
        self.in_flight.remove(&operation);
    }

    fn is_current(&self, key: &str) -> bool {
        self.current_key() == Some(key)
    }

    fn require_current(&mut self) -> AppResult<String> {
        match self.current_key() {
            Some(key) => Ok(key.to_string()),
            None => Err(self.reject(AppError::invalid_state("no ticket is open"))),
        }
    }

    pub fn affordances(&self) -> Affordances {
        let viewing = self.state == WorkflowState::ViewingTicket && self.current.is_some();
        let reviewing = matches!(self.state, WorkflowState::ReviewingSolution { .. });
        let busy = self.in_flight.iter().any(|op| op.blocks_ticket_actions());
        let linked = self
            .current
            .as_ref()
            .is_some_and(|current| current.external_link.is_some());

        Affordances {
            generate_solution: Affordance {
                enabled: viewing && !busy && !linked,
                label: if linked {
                    "PR Active (Solution Disabled)"
                } else {
                    "Generate Draft Solution"
                },
            },
            github_flow: Affordance {
                enabled: viewing && !busy && !linked,
                label: if linked {
                    "PR Exists (Flow Disabled)"
                } else {
                    "GitHub Flow"
                },
            },
            publish_solution: reviewing && !busy,
            cancel_review: reviewing && !busy,
            post_comment: self.current.is_some() && !self.is_in_flight(Operation::PostingComment),
        }
    }

    /// Drops everything tied to the current ticket, cancelling any
    /// outstanding progress timers.
    fn leave_ticket(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            progress.cancel_timers();
        }
        self.progress = None;
        self.github_prompt = None;
        self.current = None;
        self.state = WorkflowState::Listing;
    }

    // ---- ticket list ----

    /// Enters `Listing` and starts a list query. `None` re-issues the
    /// current status filter.
    pub fn begin_list(&mut self, filter: Option<StatusFilter>) -> AppResult<StatusFilter> {
        self.begin(Operation::LoadingList)?;
        if let Some(filter) = filter {
            self.status_filter = filter;
        }
        self.leave_ticket();
        self.console.hide();
        self.tickets.clear();
        self.list_status = ListStatus::Loading;
        Ok(self.status_filter)
    }

    pub fn finish_list(&mut self, result: AppResult<Vec<TicketSummary>>) {
        self.end(Operation::LoadingList);
        match result {
            Ok(tickets) => {
                for ticket in &tickets {
                    self.cache.upsert(ticket.clone());
                }
                tracing::debug!(
                    count = tickets.len(),
                    filter = self.status_filter.as_str(),
                    "ticket list loaded"
                );
                self.tickets = tickets;
                self.list_status = ListStatus::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "ticket list failed");
                self.list_status = ListStatus::Failed(err.to_string());
                self.notify_error(err.to_string());
            }
        }
    }

    /// Re-filters the last fetched list; never fetches.
    pub fn select_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
    }

    // ---- ticket detail ----

    /// Returns the normalized key to fetch, or `None` for an empty query.
    pub fn begin_search(&mut self, query: &str) -> AppResult<Option<String>> {
        let key = normalize_key(query);
        if key.is_empty() {
            return Ok(None);
        }
        self.begin(Operation::LoadingTicket)?;
        Ok(Some(key))
    }

    /// Returns `true` when the ticket became current. On failure the session
    /// falls back to `Listing`.
    pub fn finish_search(&mut self, key: &str, result: AppResult<Ticket>) -> bool {
        self.end(Operation::LoadingTicket);
        match result {
            Ok(ticket) => {
                self.display_ticket(ticket);
                true
            }
            Err(err) => {
                tracing::warn!(ticket = %key, error = %err, "ticket lookup failed");
                self.notify_error(err.to_string());
                self.leave_ticket();
                false
            }
        }
    }

    /// Makes `ticket` current, replacing any previous one wholesale.
    pub fn display_ticket(&mut self, ticket: Ticket) {
        self.leave_ticket();
        self.console.hide();

        for summary in ticket.subtasks.iter().filter_map(SubtaskRef::to_summary) {
            if !self.tickets.iter().any(|known| known.key == summary.key) {
                self.tickets.push(summary.clone());
            }
            self.cache.upsert(summary);
        }

        tracing::debug!(ticket = %ticket.key, "ticket displayed");
        self.current = Some(CurrentTicket {
            ticket,
            external_link: None,
            comments: CommentsPanel::Loading,
        });
        self.state = WorkflowState::ViewingTicket;
    }

    pub fn begin_comments(&mut self) -> Option<String> {
        let current = self.current.as_mut()?;
        current.comments = CommentsPanel::Loading;
        Some(current.ticket.key.clone())
    }

    pub fn finish_comments(&mut self, key: &str, result: AppResult<Vec<Comment>>) {
        let Some(current) = self.current.as_mut().filter(|c| c.ticket.key == key) else {
            return;
        };
        current.comments = match result {
            Ok(comments) => CommentsPanel::Loaded(comments),
            Err(err) => {
                tracing::warn!(ticket = %key, error = %err, "failed to load comments");
                CommentsPanel::Failed
            }
        };
    }

    pub fn finish_external_link(&mut self, key: &str, result: AppResult<ExternalLinkStatus>) {
        let Some(current) = self.current.as_mut().filter(|c| c.ticket.key == key) else {
            return;
        };
        match result {
            Ok(status) => {
                if let Some(url) = &status.linked_url {
                    tracing::info!(
                        ticket = %key,
                        url = %url,
                        "ticket already has a linked pull request"
                    );
                }
                current.external_link = status.linked_url;
            }
            Err(err) => {
                tracing::warn!(ticket = %key, error = %err, "failed to check external link status")
            }
        }
    }

    // ---- solution review ----

    pub fn begin_generate(&mut self) -> AppResult<String> {
        let key = self.require_current()?;
        if !self.affordances().generate_solution.enabled {
            return Err(self.reject(AppError::invalid_state(
                "solution generation is not available right now",
            )));
        }
        self.begin(Operation::GeneratingSolution)?;
        self.console
            .show(&format!("Generating solution draft for {key}..."));
        self.console.loader = Some("AI is analyzing ticket and generating solution...".to_string());
        Ok(key)
    }

    pub fn finish_generate(&mut self, key: &str, result: AppResult<SolutionDraft>) {
        self.end(Operation::GeneratingSolution);
        self.console.loader = None;
        if !self.is_current(key) {
            tracing::debug!(ticket = %key, "dropping solution for a ticket that is no longer open");
            return;
        }
        match result {
            Ok(draft) => {
                self.console.append("✅ Draft Generated!");
                self.console
                    .append("Please review the solution in the editor before publishing.");
                self.state = WorkflowState::ReviewingSolution {
                    draft: draft.solution,
                };
            }
            Err(err) => {
                self.console.append(format!("❌ Error: {err}"));
                self.notify_error(format!("Failed to generate solution: {err}"));
            }
        }
    }

    pub fn edit_solution(&mut self, text: &str) -> AppResult<()> {
        match &mut self.state {
            WorkflowState::ReviewingSolution { draft } => {
                *draft = text.to_string();
                Ok(())
            }
            _ => Err(self.reject(AppError::invalid_state("no solution is under review"))),
        }
    }

    /// Discards the draft unconditionally.
    pub fn cancel_review(&mut self) -> AppResult<()> {
        if !self.affordances().cancel_review {
            return Err(self.reject(AppError::invalid_state("no solution review can be cancelled")));
        }
        self.state = WorkflowState::ViewingTicket;
        Ok(())
    }

    /// Stores `edited` as the draft, then validates it. Returns the ticket key
    /// and trimmed solution to publish.
    pub fn begin_publish(&mut self, edited: &str) -> AppResult<(String, String)> {
        self.edit_solution(edited)?;
        let key = self.require_current()?;

        let solution = edited.trim().to_string();
        if solution.is_empty() {
            return Err(self.reject(AppError::validation("Solution cannot be empty")));
        }
        if !self.affordances().publish_solution {
            let err = AppError::invalid_state("solution cannot be published right now");
            return Err(self.reject(err));
        }
        self.begin(Operation::PublishingSolution)?;
        self.console
            .show(&format!("Publishing reviewed solution for {key}..."));
        self.console.loader =
            Some("Posting comment, creating sub-tasks, and updating description...".to_string());
        Ok((key, solution))
    }

    /// On failure the session stays in review with the edited draft intact.
    pub fn finish_publish(&mut self, key: &str, result: AppResult<PublishOutcome>) {
        self.end(Operation::PublishingSolution);
        self.console.loader = None;
        match result {
            Ok(outcome) => {
                self.console.append("✅ Successfully published!");
                if let Some(comment_id) = &outcome.comment_id {
                    self.console.append(format!("Comment ID: {comment_id}"));
                }
                if !outcome.created_subtask_keys.is_empty() {
                    self.console.append(format!(
                        "Created Sub-tasks: {}",
                        outcome.created_subtask_keys.join(", ")
                    ));
                }
                for error in &outcome.subtask_errors {
                    self.console.append(format!("⚠️ Sub-task error: {error}"));
                }
                if outcome.description_updated {
                    self.console.append("Description updated with the solution.");
                }
                self.notify_success("Solution published!");
                let reviewing = matches!(self.state, WorkflowState::ReviewingSolution { .. });
                if self.is_current(key) && reviewing {
                    self.state = WorkflowState::ViewingTicket;
                }
            }
            Err(err) => {
                self.console.append(format!("❌ Error: {err}"));
                self.notify_error(format!("Failed to publish solution: {err}"));
            }
        }
    }

    // ---- GitHub flow ----

    /// Opens the confirmation step pre-filled with `defaults`.
    pub fn request_github_flow(&mut self, defaults: GithubFlowParams) -> AppResult<()> {
        let key = self.require_current()?;
        if !self.affordances().github_flow.enabled {
            let err = AppError::invalid_state("GitHub flow is not available right now");
            return Err(self.reject(err));
        }
        self.github_prompt = Some(GithubPrompt {
            ticket_key: key,
            params: defaults,
        });
        Ok(())
    }

    pub fn dismiss_github_prompt(&mut self) {
        self.github_prompt = None;
    }

    /// Confirms the open prompt and enters `RunningGithubFlow`, scheduling the
    /// cosmetic stage timers from `now`.
    pub fn begin_github_flow(
        &mut self,
        params: GithubFlowParams,
        now: Instant,
        timing: &ProgressTiming,
    ) -> AppResult<(String, GithubFlowParams)> {
        let key = self.require_current()?;
        let prompt_matches = self
            .github_prompt
            .as_ref()
            .is_some_and(|prompt| prompt.ticket_key == key);
        if !prompt_matches {
            return Err(self.reject(AppError::invalid_state("no GitHub flow confirmation is open")));
        }

        let params = params.normalized();
        if params.language.is_empty() {
            return Err(self.reject(AppError::validation("Language is required")));
        }
        if !self.affordances().github_flow.enabled {
            let err = AppError::invalid_state("GitHub flow is not available right now");
            return Err(self.reject(err));
        }
        self.begin(Operation::RunningGithubFlow)?;

        self.github_prompt = None;
        self.state = WorkflowState::RunningGithubFlow;
        self.console
            .show(&format!("Triggering GitHub workflow for {key}..."));
        self.console.loader = Some("AI is executing workflow...".to_string());
        self.progress = Some(GithubFlowProgress::start(now, timing));
        Ok((key, params))
    }

    /// Applies a cosmetic timer firing; stale firings are ignored.
    pub fn fire_progress_timer(&mut self, timer: ProgressTimer) -> bool {
        if self.state != WorkflowState::RunningGithubFlow {
            return false;
        }
        let fired = self
            .progress
            .as_mut()
            .is_some_and(|progress| progress.fire(timer));
        if fired {
            tracing::debug!(?timer, "progress stage advanced");
        }
        fired
    }

    pub fn finish_github_flow(
        &mut self,
        key: &str,
        result: AppResult<GithubFlowOutcome>,
        now: Instant,
        timing: &ProgressTiming,
    ) {
        self.end(Operation::RunningGithubFlow);
        self.console.loader = None;

        if let Some(progress) = self.progress.as_mut() {
            match result {
                Ok(_) => progress.complete(now, timing),
                Err(_) => progress.abandon(now, timing),
            }
        }

        match result {
            Ok(outcome) => {
                self.console.append("✅ Success!");
                self.console.append(format!("Status: {}", outcome.status));
                self.console.append(format!("Branch: {}", outcome.branch));
                self.console.append(format!(
                    "PR Output: {}",
                    outcome.output.as_deref().unwrap_or("-")
                ));
                self.console.append(format!(
                    "Comment ID: {}",
                    outcome.linked_comment_id.as_deref().unwrap_or("-")
                ));
                self.notify_success("GitHub flow completed successfully!");
            }
            Err(err) => {
                self.console.append(format!("❌ Error: {err}"));
                self.notify_error(format!("GitHub flow failed: {err}"));
            }
        }

        if self.is_current(key) && self.state == WorkflowState::RunningGithubFlow {
            self.state = WorkflowState::ViewingTicket;
        }
    }

    /// Timer-driven housekeeping: hides the progress indicator after its
    /// grace delay.
    pub fn tick(&mut self, now: Instant) {
        let hidden = self
            .progress
            .as_mut()
            .is_some_and(|progress| progress.tick(now));
        if hidden {
            self.progress = None;
        }
    }

    // ---- comments ----

    pub fn begin_post_comment(&mut self, body: &str) -> AppResult<(String, String)> {
        let key = self.require_current()?;
        let body = body.trim().to_string();
        if body.is_empty() {
            return Err(self.reject(AppError::validation("Comment cannot be empty")));
        }
        self.begin(Operation::PostingComment)?;
        Ok((key, body))
    }

    /// Returns `true` when the comments panel should be refreshed.
    pub fn finish_post_comment(&mut self, key: &str, result: AppResult<()>) -> bool {
        self.end(Operation::PostingComment);
        match result {
            Ok(()) => {
                self.notify_success("Comment posted!");
                self.is_current(key)
            }
            Err(err) => {
                self.notify_error(format!("Failed to post comment: {err}"));
                false
            }
        }
    }

    // ---- ticket draft editor ----

    pub fn open_draft(&mut self, mode: DraftMode, default_project: Option<&str>) -> AppResult<()> {
        if mode == DraftMode::Update {
            self.require_current()?;
        }

        let project_key = match mode {
            DraftMode::Create => self
                .current
                .as_ref()
                .map(|current| current.ticket.project_key().to_string())
                .or_else(|| self.cache.first_project().map(str::to_string))
                .or_else(|| default_project.map(str::to_string))
                .unwrap_or_default(),
            DraftMode::Update => String::new(),
        };

        self.draft_editor = Some(TicketDraftEditor {
            mode,
            prompt: String::new(),
            project_key,
            summary: String::new(),
            description: String::new(),
            fields_open: mode == DraftMode::Create,
        });
        Ok(())
    }

    /// Returns the prompt and, for updates, the ticket providing context.
    /// An empty prompt is a no-op.
    pub fn begin_generate_ticket_draft(&mut self) -> AppResult<Option<(String, Option<String>)>> {
        let Some(editor) = self.draft_editor.as_ref() else {
            return Err(self.reject(AppError::invalid_state("the ticket editor is not open")));
        };
        let prompt = editor.prompt.trim().to_string();
        if prompt.is_empty() {
            return Ok(None);
        }
        let existing = match editor.mode {
            DraftMode::Update => self.current_key().map(str::to_string),
            DraftMode::Create => None,
        };
        self.begin(Operation::GeneratingTicketDraft)?;
        Ok(Some((prompt, existing)))
    }

    pub fn finish_generate_ticket_draft(&mut self, result: AppResult<TicketDraft>) {
        self.end(Operation::GeneratingTicketDraft);
        match result {
            Ok(draft) => {
                let fallback_project = self.cache.first_project().map(str::to_string);
                if let Some(editor) = self.draft_editor.as_mut() {
                    editor.summary = draft.summary;
                    editor.description = draft.description;
                    if editor.mode == DraftMode::Create && editor.project_key.is_empty() {
                        editor.project_key = fallback_project.unwrap_or_default();
                    }
                    editor.fields_open = true;
                }
            }
            Err(err) => self.notify_error(format!("Failed to generate draft: {err}")),
        }
    }

    pub fn begin_submit_draft(&mut self) -> AppResult<DraftSubmission> {
        let Some(editor) = self.draft_editor.clone() else {
            return Err(self.reject(AppError::invalid_state("the ticket editor is not open")));
        };

        let draft = TicketDraft {
            summary: editor.summary.trim().to_string(),
            description: editor.description.trim().to_string(),
        };
        let submission = match editor.mode {
            DraftMode::Create => {
                let project_key = editor.project_key.trim().to_string();
                if project_key.is_empty() {
                    return Err(self.reject(AppError::validation("Project Key is required")));
                }
                DraftSubmission::Create { project_key, draft }
            }
            DraftMode::Update => DraftSubmission::Update {
                key: self.require_current()?,
                draft,
            },
        };

        let summary_missing = match &submission {
            DraftSubmission::Create { draft, .. } | DraftSubmission::Update { draft, .. } => {
                draft.summary.is_empty()
            }
        };
        if summary_missing {
            return Err(self.reject(AppError::validation("Summary is required")));
        }

        self.begin(Operation::SubmittingTicketDraft)?;
        Ok(submission)
    }

    /// Closes the editor on success; keeps its contents on failure.
    pub fn finish_submit_draft(&mut self, result: AppResult<DraftSubmitted>) {
        self.end(Operation::SubmittingTicketDraft);
        match result {
            Ok(DraftSubmitted::Created(key)) => {
                self.notify_success(format!("Ticket {key} created!"));
                self.draft_editor = None;
            }
            Ok(DraftSubmitted::Updated(key)) => {
                self.notify_success(format!("Ticket {key} updated!"));
                self.draft_editor = None;
            }
            Err(err) => self.notify_error(err.to_string()),
        }
    }
}

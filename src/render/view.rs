//! Page markup for whichever surface the session has active.

use crate::domain::filter::StatusFilter;
use crate::render::comment::render_comments;
use crate::render::markup::{escape_attr, escape_text};
use crate::render::ticket::{render_ticket_detail, render_ticket_list};
use crate::workflow::progress::{GithubFlowProgress, STAGE_LABELS, StageStatus};
use crate::workflow::session::{
    Affordance, CommentsPanel, Console, CurrentTicket, DraftMode, ListStatus, NotificationLevel,
    Session, TicketDraftEditor, WorkflowState,
};

pub fn render_session(session: &Session, tracker_url: Option<&str>) -> String {
    let mut html = String::from(r#"<main class="ticketdesk">"#);
    html.push_str(&render_notifications(session));

    match (session.state(), session.current()) {
        (WorkflowState::Listing, _) | (_, None) => html.push_str(&render_listing(session)),
        (state, Some(current)) => {
            html.push_str(&render_ticket_view(session, state, current, tracker_url))
        }
    }

    if let Some(editor) = session.draft_editor() {
        html.push_str(&render_draft_editor(editor));
    }
    html.push_str("</main>");
    html
}

fn render_notifications(session: &Session) -> String {
    session
        .notifications()
        .iter()
        .map(|note| {
            let level = match note.level {
                NotificationLevel::Success => "success",
                NotificationLevel::Error => "error",
            };
            format!(
                r#"<div class="toast {level}">{}</div>"#,
                escape_text(&note.message)
            )
        })
        .collect()
}

fn render_listing(session: &Session) -> String {
    let tabs: String = StatusFilter::ALL
        .iter()
        .map(|filter| {
            let active = if *filter == session.status_filter() {
                " active"
            } else {
                ""
            };
            format!(
                r#"<span class="filter-tab{active}" data-filter="{0}">{0}</span>"#,
                filter.as_str()
            )
        })
        .collect();

    let body = match session.list_status() {
        ListStatus::Loading => r#"<div class="loader">Loading tickets...</div>"#.to_string(),
        ListStatus::Failed(message) => {
            format!(r#"<p class="list-error">{}</p>"#, escape_text(message))
        }
        ListStatus::Idle | ListStatus::Loaded => render_ticket_list(&session.visible_tickets()),
    };

    format!(
        r#"<section class="ticket-list-view"><nav class="filters">{tabs}<span class="type-filter" data-type="{}"></span></nav>{body}</section>"#,
        escape_attr(session.type_filter().as_str())
    )
}

fn render_ticket_view(
    session: &Session,
    state: &WorkflowState,
    current: &CurrentTicket,
    tracker_url: Option<&str>,
) -> String {
    let affordances = session.affordances();
    let mut html = String::from(r#"<section class="ticket-view">"#);
    html.push_str(&render_ticket_detail(&current.ticket, tracker_url));

    html.push_str(r#"<div class="ticket-actions">"#);
    html.push_str(&button("generate-solution", affordances.generate_solution));
    html.push_str(&button("github-flow", affordances.github_flow));
    html.push_str("</div>");

    if let Some(prompt) = session.github_prompt() {
        html.push_str(&format!(
            concat!(
                r#"<form class="github-prompt" data-ticket="{}">"#,
                r#"<input name="language" value="{}"><input name="repo_url" value="{}">"#,
                r#"<input name="base_branch" value="{}"><input name="question" value="{}"></form>"#,
            ),
            escape_attr(&prompt.ticket_key),
            escape_attr(&prompt.params.language),
            escape_attr(prompt.params.repo_url.as_deref().unwrap_or_default()),
            escape_attr(prompt.params.base_branch.as_deref().unwrap_or_default()),
            escape_attr(prompt.params.question.as_deref().unwrap_or_default()),
        ));
    }

    if let WorkflowState::ReviewingSolution { draft } = state {
        html.push_str(&format!(
            concat!(
                r#"<div class="solution-review"><textarea id="solution-editor">{}</textarea>"#,
                r#"<button id="publish-solution"{}>Publish Solution</button>"#,
                r#"<button id="cancel-review"{}>Cancel</button></div>"#,
            ),
            escape_text(draft),
            disabled_attr(affordances.publish_solution),
            disabled_attr(affordances.cancel_review),
        ));
    }

    if let Some(progress) = session.progress().filter(|progress| progress.is_visible()) {
        html.push_str(&render_progress(progress));
    }
    if session.console().visible {
        html.push_str(&render_console(session.console()));
    }

    let comments = match &current.comments {
        CommentsPanel::Loading => "<em>Loading comments...</em>".to_string(),
        CommentsPanel::Failed => "<em>Failed to load comments.</em>".to_string(),
        CommentsPanel::Loaded(comments) => render_comments(comments),
    };
    html.push_str(&format!(
        r#"<section class="comments"><h3>Comments</h3>{comments}</section>"#
    ));

    html.push_str("</section>");
    html
}

fn button(id: &str, affordance: Affordance) -> String {
    format!(
        r#"<button id="{id}"{}>{}</button>"#,
        disabled_attr(affordance.enabled),
        escape_text(affordance.label)
    )
}

fn disabled_attr(enabled: bool) -> &'static str {
    if enabled { "" } else { " disabled" }
}

fn render_progress(progress: &GithubFlowProgress) -> String {
    let steps: String = STAGE_LABELS
        .iter()
        .zip(progress.stages())
        .map(|(label, status)| {
            let class = match status {
                StageStatus::Pending => "pending",
                StageStatus::Active => "active",
                StageStatus::Done => "done",
            };
            format!(r#"<li class="step {class}">{label}</li>"#)
        })
        .collect();
    format!(r#"<ol class="github-progress">{steps}</ol>"#)
}

fn render_console(console: &Console) -> String {
    let lines: String = console
        .lines
        .iter()
        .map(|line| format!(r#"<div class="console-line">{}</div>"#, escape_text(line)))
        .collect();
    let loader = console
        .loader
        .as_deref()
        .map(|label| format!(r#"<div class="loader">{}</div>"#, escape_text(label)))
        .unwrap_or_default();
    format!(r#"<div class="console">{lines}{loader}</div>"#)
}

fn render_draft_editor(editor: &TicketDraftEditor) -> String {
    let title = match editor.mode {
        DraftMode::Create => "Create Ticket",
        DraftMode::Update => "Update Ticket",
    };
    let project = match editor.mode {
        DraftMode::Create => format!(
            r#"<input name="project_key" value="{}">"#,
            escape_attr(&editor.project_key)
        ),
        DraftMode::Update => String::new(),
    };
    let fields = if editor.fields_open {
        format!(
            r#"<input name="summary" value="{}"><textarea name="description">{}</textarea>"#,
            escape_attr(&editor.summary),
            escape_text(&editor.description)
        )
    } else {
        String::new()
    };

    format!(
        r#"<form class="draft-editor"><h3>{title}</h3><textarea name="prompt">{}</textarea>{project}{fields}</form>"#,
        escape_text(&editor.prompt)
    )
}

use crate::domain::ticket::{SUBTASK_ISSUE_TYPE, SubtaskRef, Ticket, TicketSummary};
use crate::render::document::render_body;
use crate::render::markup::{escape_attr, escape_text, safe_href};

pub const EMPTY_LIST_MESSAGE: &str = "No tickets found. You're all caught up!";

pub fn render_ticket_list(tickets: &[TicketSummary]) -> String {
    if tickets.is_empty() {
        return format!(r#"<p class="empty-list">{EMPTY_LIST_MESSAGE}</p>"#);
    }

    let cards: String = tickets.iter().map(render_ticket_card).collect();
    format!(r#"<div class="ticket-list">{cards}</div>"#)
}

pub fn render_ticket_card(ticket: &TicketSummary) -> String {
    card(
        &ticket.key,
        &ticket.summary,
        ticket.issue_type_or_default(),
        ticket.status_or_default(),
        Some(ticket.assignee.as_deref().unwrap_or("Unassigned")),
    )
}

pub fn render_subtask_card(subtask: &SubtaskRef) -> String {
    card(
        subtask.key(),
        subtask.summary(),
        SUBTASK_ISSUE_TYPE,
        subtask.status(),
        None,
    )
}

fn card(
    key: &str,
    summary: &str,
    issue_type: &str,
    status: &str,
    assignee: Option<&str>,
) -> String {
    let assignee = assignee
        .map(|name| {
            format!(
                r#"<span class="ticket-assignee">Assignee: {}</span>"#,
                escape_text(name)
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r#"<div class="ticket-card" data-id="{key_attr}">"#,
            r#"<div class="ticket-card-header"><span class="ticket-key">{key}</span><p>{summary}</p></div>"#,
            r#"<div class="ticket-card-meta"><span class="badge type">{issue_type}</span>"#,
            r#"<span class="badge status">{status}</span>{assignee}</div></div>"#,
        ),
        key_attr = escape_attr(key),
        key = escape_text(key),
        summary = escape_text(summary),
        issue_type = escape_text(issue_type),
        status = escape_text(status),
        assignee = assignee,
    )
}

/// Header, metadata, description and sub-tasks of a ticket. Comments and
/// actions are rendered by the session view.
pub fn render_ticket_detail(ticket: &Ticket, tracker_url: Option<&str>) -> String {
    let browse = tracker_url
        .map(|base| {
            let href = format!("{}/browse/{}", base.trim_end_matches('/'), ticket.key);
            format!(
                r#"<a class="external-link" href="{}" target="_blank" rel="noopener noreferrer">Open in tracker</a>"#,
                safe_href(Some(&href))
            )
        })
        .unwrap_or_default();

    let description = match &ticket.description {
        Some(body) if !body.is_blank() => render_body(body),
        _ => "<em>No description provided.</em>".to_string(),
    };

    let subtasks = if ticket.subtasks.is_empty() {
        String::new()
    } else {
        let cards: String = ticket.subtasks.iter().map(render_subtask_card).collect();
        format!(r#"<section class="subtasks"><h3>Sub-tasks</h3>{cards}</section>"#)
    };

    format!(
        concat!(
            r#"<header class="ticket-header"><span class="ticket-key">{key}</span>{browse}"#,
            r#"<h2>{summary}</h2><div class="ticket-meta">"#,
            r#"<span class="badge status">{status}</span><span class="badge type">{issue_type}</span>"#,
            r#"<span class="ticket-assignee">Assignee: {assignee}</span></div></header>"#,
            r#"<section class="description">{description}</section>{subtasks}"#,
        ),
        key = escape_text(&ticket.key),
        browse = browse,
        summary = escape_text(&ticket.summary),
        status = escape_text(ticket.status.as_deref().unwrap_or("Open")),
        issue_type = escape_text(ticket.issue_type.as_deref().unwrap_or("Task")),
        assignee = escape_text(ticket.assignee_name()),
        description = description,
        subtasks = subtasks,
    )
}

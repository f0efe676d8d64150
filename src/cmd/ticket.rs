use clap::Args;

use crate::cmd::{print_html, report};
use crate::context::AppContext;
use crate::domain::filter::{StatusFilter, TypeFilter};
use crate::domain::ticket::TicketSummary;
use crate::error::{AppError, AppResult};
use crate::render::ticket::EMPTY_LIST_MESSAGE;
use crate::workflow::session::CommentsPanel;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Status filter: recent, assigned, todo, progress or done.
    #[arg(short, long, default_value = "recent")]
    pub filter: String,
    /// Issue type filter applied locally: all, task, bug, story, epic.
    #[arg(short = 't', long = "type", default_value = "all")]
    pub issue_type: String,
    /// Print the rendered page instead of a table.
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    pub key: String,
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CommentArgs {
    pub key: String,
    pub body: String,
}

pub fn parse_status_filter(value: &str) -> AppResult<StatusFilter> {
    StatusFilter::from_str(value)
        .ok_or_else(|| AppError::validation(format!("unknown status filter '{value}'")))
}

pub async fn list(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    let filter = parse_status_filter(&args.filter)?;
    let mut coordinator = ctx.coordinator();
    coordinator.select_type_filter(TypeFilter::from_str(&args.issue_type));
    coordinator.load_list(Some(filter)).await?;

    if args.html {
        print_html(&coordinator);
    } else {
        print_ticket_rows(&coordinator.session().visible_tickets());
    }
    report(&mut coordinator)
}

pub fn print_ticket_rows(tickets: &[TicketSummary]) {
    if tickets.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
    }
    for ticket in tickets {
        println!(
            "{:<12} {:<10} {:<14} {} ({})",
            ticket.key,
            ticket.issue_type_or_default(),
            ticket.status_or_default(),
            ticket.summary,
            ticket.assignee.as_deref().unwrap_or("Unassigned")
        );
    }
}

pub async fn show(ctx: &AppContext, args: ShowArgs) -> AppResult<()> {
    let mut coordinator = ctx.coordinator();
    coordinator.search(&args.key).await?;
    report(&mut coordinator)?;

    if args.html {
        print_html(&coordinator);
        return Ok(());
    }

    let Some(current) = coordinator.session().current() else {
        return Ok(());
    };
    let ticket = &current.ticket;
    println!("{} {}", ticket.key, ticket.summary);
    println!(
        "Status: {} | Type: {} | Assignee: {}",
        ticket.status.as_deref().unwrap_or("Open"),
        ticket.issue_type.as_deref().unwrap_or("Task"),
        ticket.assignee_name()
    );
    if let Some(base) = &ctx.config.workflow.tracker_url {
        println!("{base}/browse/{}", ticket.key);
    }
    if let Some(url) = &current.external_link {
        println!("Pull request: {url}");
    }
    println!();
    match &ticket.description {
        Some(body) if !body.is_blank() => println!("{}", body.plain_text()),
        _ => println!("No description provided."),
    }

    if !ticket.subtasks.is_empty() {
        println!("\nSub-tasks:");
        for subtask in &ticket.subtasks {
            println!(
                "  {} [{}] {}",
                subtask.key(),
                subtask.status(),
                subtask.summary()
            );
        }
    }

    match &current.comments {
        CommentsPanel::Loaded(comments) if comments.is_empty() => println!("\nNo comments found."),
        CommentsPanel::Loaded(comments) => {
            println!("\nComments ({}):", comments.len());
            for (index, comment) in comments.iter().enumerate() {
                let author = comment
                    .author
                    .as_ref()
                    .map(|author| author.name())
                    .unwrap_or("Unknown");
                let body = comment
                    .body
                    .as_ref()
                    .map(|body| body.plain_text())
                    .unwrap_or_default();
                println!(
                    "  #{} {} ({}): {}",
                    index + 1,
                    author,
                    comment.created.as_deref().unwrap_or("N/A"),
                    body
                );
            }
        }
        CommentsPanel::Loading | CommentsPanel::Failed => println!("\nComments unavailable."),
    }
    Ok(())
}

pub async fn comment(ctx: &AppContext, args: CommentArgs) -> AppResult<()> {
    let mut coordinator = ctx.coordinator();
    coordinator.search(&args.key).await?;
    report(&mut coordinator)?;

    coordinator.post_comment(&args.body).await?;
    report(&mut coordinator)
}

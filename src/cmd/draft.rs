use clap::{Args, Subcommand};

use crate::cmd::report;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::Coordinator;
use crate::workflow::session::DraftMode;

#[derive(Args, Debug, Clone)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: DraftCommand,
}

#[derive(Args, Debug, Clone)]
pub struct DraftFields {
    /// Describe the ticket; the backend drafts summary and description.
    #[arg(short, long)]
    pub prompt: Option<String>,
    /// Overrides the drafted summary.
    #[arg(short, long)]
    pub summary: Option<String>,
    /// Overrides the drafted description.
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Create a new ticket.
    Create {
        /// Project key; guessed from cached tickets when omitted.
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        fields: DraftFields,
    },
    /// Rewrite an existing ticket.
    Update {
        key: String,
        #[command(flatten)]
        fields: DraftFields,
    },
}

pub async fn run(ctx: &AppContext, args: DraftArgs) -> AppResult<()> {
    let mut coordinator = ctx.coordinator();
    match args.command {
        DraftCommand::Create { project, fields } => {
            if project.is_none() {
                coordinator.load_list(None).await?;
                report(&mut coordinator)?;
            }
            coordinator.open_draft(DraftMode::Create, ctx.config.default_project.as_deref())?;
            if let (Some(project), Some(editor)) =
                (project, coordinator.session_mut().draft_editor_mut())
            {
                editor.project_key = project;
            }
            fill_and_submit(&mut coordinator, fields).await
        }
        DraftCommand::Update { key, fields } => {
            coordinator.search(&key).await?;
            report(&mut coordinator)?;
            coordinator.open_draft(DraftMode::Update, None)?;
            fill_and_submit(&mut coordinator, fields).await
        }
    }
}

async fn fill_and_submit(coordinator: &mut Coordinator, fields: DraftFields) -> AppResult<()> {
    if let Some(editor) = coordinator.session_mut().draft_editor_mut() {
        editor.prompt = fields.prompt.unwrap_or_default();
    }
    coordinator.generate_ticket_draft().await?;
    report(coordinator)?;

    if let Some(editor) = coordinator.session_mut().draft_editor_mut() {
        if let Some(summary) = fields.summary {
            editor.summary = summary;
        }
        if let Some(description) = fields.description {
            editor.description = description;
        }
        println!("Summary: {}", editor.summary);
        if !editor.description.is_empty() {
            println!("{}\n", editor.description);
        }
    }

    coordinator.submit_draft().await?;
    report(coordinator)
}

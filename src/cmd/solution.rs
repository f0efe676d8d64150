use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::cmd::report;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::Coordinator;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    pub key: String,
    /// Question sent along with the ticket instead of the default prompt.
    #[arg(short, long)]
    pub question: Option<String>,
    /// Publish the contents of this file instead of the generated draft.
    #[arg(long)]
    pub edited: Option<PathBuf>,
    /// Publish after generating; otherwise the draft is printed and discarded.
    #[arg(long)]
    pub publish: bool,
}

pub async fn run(ctx: &AppContext, args: SolveArgs) -> AppResult<()> {
    let mut settings = ctx.config.workflow.clone();
    if let Some(question) = args.question.filter(|question| !question.trim().is_empty()) {
        settings.solution_question = question;
    }
    let mut coordinator = Coordinator::new(Arc::clone(&ctx.tickets), settings);

    coordinator.search(&args.key).await?;
    report(&mut coordinator)?;

    coordinator.generate_solution().await?;
    let Some(draft) = coordinator.session().solution_draft().map(str::to_string) else {
        return report(&mut coordinator);
    };
    report(&mut coordinator)?;
    println!("\n{draft}\n");

    if !args.publish {
        return coordinator.cancel_review();
    }

    if let Some(path) = &args.edited {
        coordinator.edit_solution(&fs::read_to_string(path)?)?;
    }
    let text = coordinator
        .session()
        .solution_draft()
        .map_or(draft, str::to_string);
    coordinator.publish_solution(&text).await?;
    report(&mut coordinator)
}

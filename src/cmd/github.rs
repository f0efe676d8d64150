use clap::Args;

use crate::cmd::report;
use crate::context::AppContext;
use crate::domain::github::GithubFlowParams;
use crate::error::AppResult;
use crate::workflow::progress::{GithubFlowProgress, STAGE_LABELS, StageStatus};

#[derive(Args, Debug, Clone)]
pub struct GithubArgs {
    pub key: String,
    /// Implementation language; falls back to the configured default.
    #[arg(short, long)]
    pub language: Option<String>,
    #[arg(long)]
    pub repo_url: Option<String>,
    #[arg(long)]
    pub base_branch: Option<String>,
    #[arg(short, long)]
    pub question: Option<String>,
}

/// Overlays command-line values on the configured defaults.
fn merge_params(defaults: GithubFlowParams, args: GithubArgs) -> GithubFlowParams {
    GithubFlowParams {
        language: args.language.unwrap_or(defaults.language),
        repo_url: args.repo_url.or(defaults.repo_url),
        base_branch: args.base_branch.or(defaults.base_branch),
        question: args.question.or(defaults.question),
    }
}

pub async fn run(ctx: &AppContext, args: GithubArgs) -> AppResult<()> {
    let mut coordinator = ctx.coordinator();
    coordinator.search(&args.key).await?;
    report(&mut coordinator)?;

    coordinator.request_github_flow()?;
    let params = merge_params(coordinator.github_defaults(), args);
    coordinator.run_github_flow(params).await?;

    if let Some(progress) = coordinator.session().progress() {
        print_progress(progress);
    }
    report(&mut coordinator)
}

pub fn print_progress(progress: &GithubFlowProgress) {
    for (label, status) in STAGE_LABELS.iter().zip(progress.stages()) {
        let marker = match status {
            StageStatus::Done => "✔",
            StageStatus::Active => "…",
            StageStatus::Pending => " ",
        };
        println!("[{marker}] {label}");
    }
}

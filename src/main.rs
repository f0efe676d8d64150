mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod render;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::browse::BrowseArgs;
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::draft::DraftArgs;
use crate::cmd::github::GithubArgs;
use crate::cmd::solution::SolveArgs;
use crate::cmd::ticket::{CommentArgs, ListArgs, ShowArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::BackendClient;

#[derive(Parser)]
#[command(
    name = "ticketdesk",
    author,
    version,
    about = "Browse tickets and drive AI solution and GitHub flows"
)]
struct Cli {
    /// Log workflow transitions and backend calls.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: list, open, solve, publish and run flows.
    Browse(BrowseArgs),
    /// List tickets for a status filter.
    List(ListArgs),
    /// Show a ticket with its sub-tasks and comments.
    Show(ShowArgs),
    /// Post a comment on a ticket.
    Comment(CommentArgs),
    /// Generate a solution draft and optionally publish it.
    Solve(SolveArgs),
    /// Run the GitHub flow for a ticket.
    Github(GithubArgs),
    /// Create or update a ticket from an AI draft.
    Draft(DraftArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        let code = if error.is_local() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ticketdesk=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    if let Commands::Config(args) = command {
        return config_cmd::run(args.command);
    }

    let config = AppConfig::load()?;
    tracing::debug!(backend = %config.backend_url, "using ticket backend");
    let tickets = Arc::new(BackendClient::new(&config.backend_url, config.workflow.page_size)?);
    let context = AppContext::new(config, tickets);

    match command {
        Commands::Browse(args) => cmd::browse::run(&context, args).await,
        Commands::List(args) => cmd::ticket::list(&context, args).await,
        Commands::Show(args) => cmd::ticket::show(&context, args).await,
        Commands::Comment(args) => cmd::ticket::comment(&context, args).await,
        Commands::Solve(args) => cmd::solution::run(&context, args).await,
        Commands::Github(args) => cmd::github::run(&context, args).await,
        Commands::Draft(args) => cmd::draft::run(&context, args).await,
        Commands::Config(args) => config_cmd::run(args.command),
    }
}

//! Interactive session that keeps one coordinator alive across commands.

use std::io::{self, Write};

use clap::Args;

use crate::cmd::github::print_progress;
use crate::cmd::print_html;
use crate::cmd::ticket::{parse_status_filter, print_ticket_rows};
use crate::context::AppContext;
use crate::domain::filter::{StatusFilter, TypeFilter};
use crate::error::{AppError, AppResult};
use crate::workflow::Coordinator;
use crate::workflow::session::{Affordance, DraftMode, NotificationLevel, WorkflowState};

const HELP: &str = "\
list [filter]     reload the list (recent, assigned, todo, progress, done)
type <name>       filter the list by issue type (all, task, bug, story, epic)
open <key>        open a ticket
back              return to the list
solve             generate a solution draft
edit <text>       replace the draft text
publish           publish the draft
cancel            discard the draft
github            open the GitHub flow confirmation
run [language]    confirm and run the GitHub flow
dismiss           close the GitHub flow confirmation
comment <text>    post a comment
new | rewrite     open the ticket editor to create or rewrite
ask <prompt>      draft the editor fields from a prompt
submit            create or update the ticket
quit";

#[derive(Args, Debug, Clone)]
pub struct BrowseArgs {
    /// Print the rendered page after every command instead of a summary.
    #[arg(long)]
    pub html: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    List(Option<StatusFilter>),
    Type(TypeFilter),
    Open(String),
    Back,
    Solve,
    Edit(String),
    Publish,
    Cancel,
    Github,
    Run(Option<String>),
    Dismiss,
    Comment(String),
    Draft(DraftMode),
    Ask(String),
    Submit,
    Help,
    Quit,
}

impl Action {
    /// Parses one input line. Blank lines yield `None`.
    fn parse(line: &str) -> AppResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let action = match word.to_lowercase().as_str() {
            "list" | "ls" if rest.is_empty() => Action::List(None),
            "list" | "ls" => Action::List(Some(parse_status_filter(rest)?)),
            "type" => Action::Type(TypeFilter::from_str(rest)),
            "open" | "search" => Action::Open(rest.to_string()),
            "back" => Action::Back,
            "solve" => Action::Solve,
            "edit" => Action::Edit(rest.to_string()),
            "publish" => Action::Publish,
            "cancel" => Action::Cancel,
            "github" => Action::Github,
            "run" => Action::Run(Some(rest.to_string()).filter(|lang| !lang.is_empty())),
            "dismiss" => Action::Dismiss,
            "comment" => Action::Comment(rest.to_string()),
            "new" => Action::Draft(DraftMode::Create),
            "rewrite" => Action::Draft(DraftMode::Update),
            "ask" => Action::Ask(rest.to_string()),
            "submit" => Action::Submit,
            "help" | "?" => Action::Help,
            "quit" | "exit" | "q" => Action::Quit,
            other => {
                return Err(AppError::validation(format!(
                    "unknown command '{other}', type 'help' for a list"
                )));
            }
        };
        Ok(Some(action))
    }
}

pub async fn run(ctx: &AppContext, args: BrowseArgs) -> AppResult<()> {
    let mut coordinator = ctx.coordinator();
    let default_project = ctx.config.default_project.as_deref();
    coordinator.load_list(None).await?;

    loop {
        coordinator.tick();
        if args.html {
            print_html(&coordinator);
        } else {
            print_summary(&coordinator);
        }
        print_notifications(&mut coordinator);

        print!("{}> ", prompt_label(&coordinator));
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let action = match Action::parse(&line) {
            Ok(Some(Action::Quit)) => break,
            Ok(Some(Action::Help)) => {
                println!("{HELP}");
                continue;
            }
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };
        if let Err(error) = apply(&mut coordinator, action, default_project).await {
            if !matches!(error, AppError::Validation(_)) {
                eprintln!("{error}");
            }
        }
    }
    Ok(())
}

async fn apply(
    coordinator: &mut Coordinator,
    action: Action,
    default_project: Option<&str>,
) -> AppResult<()> {
    match action {
        Action::List(filter) => coordinator.load_list(filter).await,
        Action::Type(filter) => {
            coordinator.select_type_filter(filter);
            Ok(())
        }
        Action::Open(key) => coordinator.open_ticket(&key).await,
        Action::Back => coordinator.back().await,
        Action::Solve => coordinator.generate_solution().await,
        Action::Edit(text) => coordinator.edit_solution(&text),
        Action::Publish => {
            let text = coordinator
                .session()
                .solution_draft()
                .unwrap_or_default()
                .to_string();
            coordinator.publish_solution(&text).await
        }
        Action::Cancel => coordinator.cancel_review(),
        Action::Github => coordinator.request_github_flow(),
        Action::Run(language) => {
            let mut params = coordinator
                .session()
                .github_prompt()
                .map(|prompt| prompt.params.clone())
                .unwrap_or_else(|| coordinator.github_defaults());
            if let Some(language) = language {
                params.language = language;
            }
            coordinator.run_github_flow(params).await
        }
        Action::Dismiss => {
            coordinator.dismiss_github_prompt();
            Ok(())
        }
        Action::Comment(body) => coordinator.post_comment(&body).await,
        Action::Draft(mode) => coordinator.open_draft(mode, default_project),
        Action::Ask(prompt) => {
            if let Some(editor) = coordinator.session_mut().draft_editor_mut() {
                editor.prompt = prompt;
            }
            coordinator.generate_ticket_draft().await
        }
        Action::Submit => coordinator.submit_draft().await,
        Action::Help | Action::Quit => Ok(()),
    }
}

fn prompt_label(coordinator: &Coordinator) -> String {
    let session = coordinator.session();
    match (session.state(), session.current_key()) {
        (WorkflowState::Listing, _) | (_, None) => session.status_filter().as_str().to_string(),
        (WorkflowState::ReviewingSolution { .. }, Some(key)) => format!("{key} review"),
        (WorkflowState::RunningGithubFlow, Some(key)) => format!("{key} github"),
        (WorkflowState::ViewingTicket, Some(key)) => key.to_string(),
    }
}

fn print_summary(coordinator: &Coordinator) {
    let session = coordinator.session();
    match (session.state(), session.current()) {
        (WorkflowState::Listing, _) | (_, None) => {
            println!(
                "\n[{} / {}]",
                session.status_filter().as_str(),
                session.type_filter().as_str()
            );
            print_ticket_rows(&session.visible_tickets());
        }
        (state, Some(current)) => {
            let ticket = &current.ticket;
            println!(
                "\n{} {} ({})",
                ticket.key,
                ticket.summary,
                ticket.assignee_name()
            );
            if let Some(url) = &current.external_link {
                println!("Pull request: {url}");
            }
            let affordances = session.affordances();
            println!(
                "{} | {}",
                button(affordances.generate_solution),
                button(affordances.github_flow)
            );
            if let WorkflowState::ReviewingSolution { draft } = state {
                println!("--- draft (publish / edit / cancel) ---\n{draft}\n---");
            }
        }
    }

    if let Some(prompt) = session.github_prompt() {
        let params = &prompt.params;
        println!(
            "GitHub flow for {}: language={} repo={} base={} (run / dismiss)",
            prompt.ticket_key,
            params.language,
            params.repo_url.as_deref().unwrap_or("-"),
            params.base_branch.as_deref().unwrap_or("-")
        );
    }
    if let Some(progress) = session.progress() {
        print_progress(progress);
    }
    let console = session.console();
    if console.visible {
        for line in &console.lines {
            println!("{line}");
        }
    }
    if let Some(editor) = session.draft_editor() {
        let target = match editor.mode {
            DraftMode::Create => format!("new ticket in {}", editor.project_key),
            DraftMode::Update => "rewrite".to_string(),
        };
        println!("Editor ({target}): {}", editor.summary);
    }
}

fn button(affordance: Affordance) -> String {
    if affordance.enabled {
        affordance.label.to_string()
    } else {
        format!("({})", affordance.label)
    }
}

fn print_notifications(coordinator: &mut Coordinator) {
    for note in coordinator.drain_notifications() {
        match note.level {
            NotificationLevel::Success => println!("✔ {}", note.message),
            NotificationLevel::Error => eprintln!("✖ {}", note.message),
        }
    }
}

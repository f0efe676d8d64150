use std::io::{self, Write};

use clap::{Args, Subcommand, ValueEnum};
use reqwest::Url;

use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::domain::ticket::normalize_key;
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Walk through every setting interactively.
    Init,
    /// Show the stored configuration and the effective backend.
    Show,
    /// Store a single setting.
    Set { key: ConfigKey, value: String },
    /// Remove a single setting.
    Unset { key: ConfigKey },
}

/// A setting persisted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    BackendUrl,
    TrackerUrl,
    Project,
    Language,
    RepoUrl,
    BaseBranch,
}

impl ConfigKey {
    const ALL: [ConfigKey; 6] = [
        ConfigKey::BackendUrl,
        ConfigKey::TrackerUrl,
        ConfigKey::Project,
        ConfigKey::Language,
        ConfigKey::RepoUrl,
        ConfigKey::BaseBranch,
    ];

    fn label(self) -> &'static str {
        match self {
            ConfigKey::BackendUrl => "Ticket backend URL (e.g., http://127.0.0.1:8000)",
            ConfigKey::TrackerUrl => "Tracker URL for browse links",
            ConfigKey::Project => "Default project key",
            ConfigKey::Language => "Default GitHub flow language",
            ConfigKey::RepoUrl => "Default GitHub repository URL",
            ConfigKey::BaseBranch => "Default GitHub base branch",
        }
    }

    fn slot(self, cfg: &mut StoredConfig) -> &mut Option<String> {
        match self {
            ConfigKey::BackendUrl => &mut cfg.backend_url,
            ConfigKey::TrackerUrl => &mut cfg.tracker_url,
            ConfigKey::Project => &mut cfg.default_project,
            ConfigKey::Language => &mut cfg.github_language,
            ConfigKey::RepoUrl => &mut cfg.github_repo_url,
            ConfigKey::BaseBranch => &mut cfg.github_base_branch,
        }
    }

    fn get(self, cfg: &StoredConfig) -> Option<&str> {
        let value = match self {
            ConfigKey::BackendUrl => &cfg.backend_url,
            ConfigKey::TrackerUrl => &cfg.tracker_url,
            ConfigKey::Project => &cfg.default_project,
            ConfigKey::Language => &cfg.github_language,
            ConfigKey::RepoUrl => &cfg.github_repo_url,
            ConfigKey::BaseBranch => &cfg.github_base_branch,
        };
        value.as_deref().filter(|value| !value.is_empty())
    }

    /// Validates and canonicalizes user input for this setting.
    fn normalize(self, raw: &str) -> AppResult<String> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(AppError::validation("value cannot be empty"));
        }
        match self {
            ConfigKey::BackendUrl | ConfigKey::TrackerUrl | ConfigKey::RepoUrl => {
                let url = Url::parse(value).map_err(|err| {
                    AppError::validation(format!("'{value}' is not a URL: {err}"))
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::validation(format!("'{value}' must use http or https")));
                }
                Ok(value.trim_end_matches('/').to_string())
            }
            ConfigKey::Project => {
                let key = normalize_key(value);
                if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    Ok(key)
                } else {
                    Err(AppError::validation(format!("'{value}' is not a project key")))
                }
            }
            ConfigKey::Language => Ok(value.to_lowercase()),
            ConfigKey::BaseBranch => Ok(value.to_string()),
        }
    }
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
        ConfigCommand::Set { key, value } => update(|cfg| {
            *key.slot(cfg) = Some(key.normalize(&value)?);
            Ok(())
        }),
        ConfigCommand::Unset { key } => update(|cfg| {
            *key.slot(cfg) = None;
            Ok(())
        }),
    }
}

fn update(apply: impl FnOnce(&mut StoredConfig) -> AppResult<()>) -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    apply(&mut cfg)?;
    save(&cfg)
}

fn save(cfg: &StoredConfig) -> AppResult<()> {
    cfg.save()?;
    println!("Configuration saved to {}", config_file_path()?.display());
    Ok(())
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring ticketdesk.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!();

    for key in ConfigKey::ALL {
        let value = ask(key, key.get(&cfg))?;
        *key.slot(&mut cfg) = value;
    }
    println!();
    save(&cfg)
}

/// Prompts until the input is valid for `key`. Returns the new value.
fn ask(key: ConfigKey, current: Option<&str>) -> AppResult<Option<String>> {
    let mut stdout = io::stdout();
    loop {
        match current {
            Some(value) => write!(stdout, "{} [{value}]: ", key.label())?,
            None => write!(stdout, "{}: ", key.label())?,
        }
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        match resolve_input(key, current, &input) {
            Ok(value) => return Ok(value),
            Err(err) => println!("  {err}"),
        }
    }
}

/// Enter keeps `current`, `-` clears it, anything else must validate.
fn resolve_input(key: ConfigKey, current: Option<&str>, input: &str) -> AppResult<Option<String>> {
    match input.trim() {
        "" => Ok(current.map(str::to_string)),
        "-" => Ok(None),
        value => key.normalize(value).map(Some),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;
    let effective = AppConfig::from_stored(cfg.clone());

    println!("Configuration file: {}", path.display());
    for key in ConfigKey::ALL {
        let name = key.to_possible_value().map(|value| value.get_name().to_string());
        println!(
            "{:<12} {}",
            name.unwrap_or_default(),
            key.get(&cfg).unwrap_or("<not set>")
        );
    }
    println!();
    println!("Effective backend: {}", effective.backend_url);
    println!(
        "Effective project: {}",
        effective.default_project.as_deref().unwrap_or("<not set>")
    );

    Ok(())
}

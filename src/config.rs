use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "ticketdesk";
const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

pub const DEFAULT_SOLUTION_QUESTION: &str = "Provide an approach plan (numbered steps), the detailed solution, and if this is a Story/Epic a 'Suggested sub-tasks:' list.";

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("cannot resolve a config directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Settings persisted by `ticketdesk config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub backend_url: Option<String>,
    pub tracker_url: Option<String>,
    pub default_project: Option<String>,
    pub github_language: Option<String>,
    pub github_repo_url: Option<String>,
    pub github_base_branch: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

/// Cosmetic pacing of the three-stage GitHub flow indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTiming {
    pub first_stage: Duration,
    pub second_stage: Duration,
    pub hide_grace: Duration,
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            first_stage: Duration::from_secs(12),
            second_stage: Duration::from_secs(22),
            hide_grace: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub page_size: u32,
    pub solution_question: String,
    pub progress: ProgressTiming,
    pub tracker_url: Option<String>,
    pub github_language: Option<String>,
    pub github_repo_url: Option<String>,
    pub github_base_branch: Option<String>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            solution_question: DEFAULT_SOLUTION_QUESTION.to_string(),
            progress: ProgressTiming::default(),
            tracker_url: None,
            github_language: None,
            github_repo_url: None,
            github_base_branch: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub default_project: Option<String>,
    pub workflow: WorkflowSettings,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Ok(Self::from_stored(StoredConfig::load()?))
    }

    /// Applies environment overrides on top of the stored file.
    pub fn from_stored(stored: StoredConfig) -> Self {
        let backend_url = env_override("TICKETDESK_BACKEND_URL")
            .or(stored.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let default_project = env_override("TICKETDESK_PROJECT").or(stored.default_project);

        Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            default_project,
            workflow: WorkflowSettings {
                tracker_url: stored
                    .tracker_url
                    .map(|url| url.trim_end_matches('/').to_string()),
                github_language: stored.github_language,
                github_repo_url: stored.github_repo_url,
                github_base_branch: stored.github_base_branch,
                ..WorkflowSettings::default()
            },
        }
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_fill_workflow_settings() {
        let config = AppConfig::from_stored(StoredConfig {
            tracker_url: Some("https://acme.atlassian.net/".to_string()),
            github_language: Some("rust".to_string()),
            ..StoredConfig::default()
        });

        assert_eq!(
            config.workflow.tracker_url.as_deref(),
            Some("https://acme.atlassian.net")
        );
        assert_eq!(config.workflow.github_language.as_deref(), Some("rust"));
        assert_eq!(config.workflow.page_size, 20);
        let progress = &config.workflow.progress;
        assert_eq!(progress.first_stage, Duration::from_secs(12));
        assert_eq!(progress.second_stage, Duration::from_secs(22));
    }
}

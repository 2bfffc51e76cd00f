use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TRELLO_API_URL: &str = "https://api.trello.com/1";
pub const DEFAULT_LIST_NAME: &str = "open prs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level configuration loaded from .gitrello.toml.
///
/// Every field may be left out of the file and supplied through the
/// environment instead; required values are checked when the clients are built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub trello: TrelloConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Override for the REST endpoint (GitHub Enterprise)
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrelloConfig {
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    /// Short id of the board cards are synced to
    pub board_id: Option<String>,
    /// Name of the open list new cards are created in
    pub list_name: Option<String>,
    pub api_url: Option<String>,
}

/// Resolved Trello settings with every required value present.
#[derive(Debug, Clone)]
pub struct TrelloSettings {
    pub api_key: String,
    pub api_token: String,
    pub board_id: String,
    pub list_name: String,
    pub api_url: String,
}

impl Config {
    /// Load configuration from .gitrello.toml in the current directory,
    /// then fill unset values from the environment.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".gitrello.toml");
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// File values win; the lookup only fills the gaps.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fill(&mut self.github.token, || lookup("GITHUB_TOKEN"));
        fill(&mut self.trello.api_key, || lookup("TRELLO_API_KEY"));
        fill(&mut self.trello.api_token, || lookup("TRELLO_API_TOKEN"));
        fill(&mut self.trello.board_id, || lookup("TRELLO_BOARD_ID"));
        fill(&mut self.trello.list_name, || lookup("TRELLO_LIST_NAME"));
    }

    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    pub fn github_api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
    }

    pub fn trello_settings(&self) -> Result<TrelloSettings, ConfigError> {
        let trello = &self.trello;
        Ok(TrelloSettings {
            api_key: trello
                .api_key
                .clone()
                .ok_or(ConfigError::Missing("trello.api_key"))?,
            api_token: trello
                .api_token
                .clone()
                .ok_or(ConfigError::Missing("trello.api_token"))?,
            board_id: trello
                .board_id
                .clone()
                .ok_or(ConfigError::Missing("trello.board_id"))?,
            list_name: trello
                .list_name
                .clone()
                .unwrap_or_else(|| DEFAULT_LIST_NAME.to_string()),
            api_url: trello
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_TRELLO_API_URL.to_string()),
        })
    }
}

fn fill(slot: &mut Option<String>, value: impl FnOnce() -> Option<String>) {
    if slot.is_none() {
        *slot = value().filter(|v| !v.is_empty());
    }
}

use std::str::FromStr;
use std::time::Duration;

use crate::leaderboard::{BoardId, PushPolicy, SyncConfig};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://runner_scores.db";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {variable}")]
    InvalidValue { variable: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct CoreConfig {
    pub database_url: String,
    pub sync: SyncConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            sync: SyncConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Reads the configuration from the environment, loading `.env` first.
    ///
    /// Recognized variables: `DATABASE_URL`, `LEADERBOARD_IDS`,
    /// `LEADERBOARD_PUSH_POLICY`, `LEADERBOARD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|variable| dotenv::var(variable).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(ids) = lookup("LEADERBOARD_IDS") {
            config.sync.boards = parse_board_ids(&ids)?;
        }
        if let Some(policy) = lookup("LEADERBOARD_PUSH_POLICY") {
            config.sync.policy = policy.parse::<PushPolicy>().map_err(|_| ConfigError::InvalidValue {
                variable: "LEADERBOARD_PUSH_POLICY",
                value: policy.clone(),
            })?;
        }
        if let Some(secs) = lookup("LEADERBOARD_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                variable: "LEADERBOARD_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.sync.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_board_ids(ids: &str) -> Result<Vec<BoardId>, ConfigError> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<BoardId>().map_err(|_| ConfigError::InvalidValue {
                variable: "LEADERBOARD_IDS",
                value: ids.to_owned(),
            })
        })
        .collect()
}

impl FromStr for PushPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "if-better" | "only-if-better" => Ok(Self::OnlyIfBetter),
            _ => Err(()),
        }
    }
}

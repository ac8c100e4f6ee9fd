use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub endpoint: String,
    pub api_key: String,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub leaderboard_dir: PathBuf,
    pub session_db: String,
    pub oracle: OracleConfig,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = var("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let timeout = match var("ORACLE_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::InvalidTimeout {
                        key: "ORACLE_TIMEOUT_SECS",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            data_dir: var("QUIZ_DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            leaderboard_dir: var("LEADERBOARD_DIR").unwrap_or_else(|| ".".into()).into(),
            session_db: var("SESSION_DB").unwrap_or_else(|| "db.sqlite".into()),
            oracle: OracleConfig {
                endpoint: var("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.into()),
                api_key,
                timeout,
            },
        })
    }
}

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::notice::NOTICE_TTL;
use crate::preview::Markup;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_SUBMIT_PATH: &str = "/create_resume";
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Client configuration loaded from environment variables.
/// Every variable is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// `/create_resume` or `/generate`, depending on the deployment.
    pub submit_path: String,
    pub notice_ttl: Duration,
    pub download_dir: PathBuf,
    pub markup: Markup,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let notice_ttl = match parse_var::<u64, _>(&lookup, "NOTICE_TTL_SECS")? {
            Some(secs) => Duration::from_secs(secs),
            None => NOTICE_TTL,
        };
        let markup = match parse_var::<bool, _>(&lookup, "PREVIEW_ESCAPE")? {
            Some(false) => Markup::Raw,
            _ => Markup::Escaped,
        };

        Ok(Config {
            api_url: lookup("RESUME_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            submit_path: lookup("RESUME_SUBMIT_PATH")
                .unwrap_or_else(|| DEFAULT_SUBMIT_PATH.to_string()),
            notice_ttl,
            download_dir: lookup("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            markup,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
        })
        .transpose()
}

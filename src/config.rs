use crate::scrapers::types::{ScrapeParams, DEFAULT_USER_AGENT};
use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub struct Config {
    pub params: ScrapeParams,
    pub output_dir: PathBuf,
}

impl Config {
    /// Read settings from the environment, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            params: ScrapeParams {
                user_agent: env::var("DAKAR_AUTO_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
                timeout: Duration::from_secs(env_u64("DAKAR_AUTO_TIMEOUT_SECS", 10)?),
                page_delay: Duration::from_secs(env_u64("DAKAR_AUTO_PAGE_DELAY_SECS", 2)?),
            },
            output_dir: env::var("DAKAR_AUTO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        })
    }
}

fn env_u64(key: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds", key)),
        Err(_) => Ok(default),
    }
}

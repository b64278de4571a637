//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default address the HTTP events listener binds to.
fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Default route Slack delivers Events API callbacks to.
fn default_events_path() -> String {
    "/slack/events".to_string()
}

/// Default number of remembered events before the ledger is reset.
fn default_dedup_threshold() -> usize {
    1000
}

/// Default period between ledger compactions, in seconds.
fn default_compact_interval_secs() -> u64 {
    60
}

/// How events reach the bot.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Events API webhooks over HTTP.
    #[default]
    Http,
    /// Slack Socket Mode.
    Socket,
}

/// Configuration for the thread-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`), required for the `http` transport.
    #[serde(default)]
    pub slack_signing_secret: Option<String>,
    /// Slack app token (`SLACK_APP_TOKEN`), required for the `socket` transport.
    #[serde(default)]
    pub slack_app_token: Option<String>,
    /// Event transport (`TRANSPORT`): `http` or `socket`.
    #[serde(default)]
    pub transport: Transport,
    /// Address the HTTP listener binds to (`LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Route for Events API callbacks (`EVENTS_PATH`).
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Ledger size above which a compaction resets it (`DEDUP_THRESHOLD`).
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: usize,
    /// Seconds between ledger compactions (`COMPACT_INTERVAL_SECS`).
    #[serde(default = "default_compact_interval_secs")]
    pub compact_interval_secs: u64,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("THREAD_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks the cross-field constraints `serde` cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.slack_bot_token.is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must be set."));
        }

        if self.dedup_threshold < 1 {
            return Err(anyhow::anyhow!("Dedup threshold must be at least 1."));
        }

        if self.compact_interval_secs < 1 {
            return Err(anyhow::anyhow!("Compaction interval must be at least 1 second."));
        }

        match self.transport {
            Transport::Http if self.slack_signing_secret.as_deref().is_none_or(str::is_empty) => {
                Err(anyhow::anyhow!("The `http` transport requires a Slack signing secret."))
            }
            Transport::Socket if self.slack_app_token.as_deref().is_none_or(str::is_empty) => {
                Err(anyhow::anyhow!("The `socket` transport requires a Slack app token."))
            }
            _ => Ok(()),
        }
    }
}

// Tests.

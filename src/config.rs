use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr};

use crate::services::{
    ingest_service::DEFAULT_MAX_LABELS,
    intent::{BotSettings, SessionPolicy},
    signing::SigningScope,
};

/// How the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Lambda handler for storage notifications.
    Index,
    /// Lambda handler for search requests.
    Search,
    /// Local HTTP server exposing both handlers.
    Serve,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        <Mode as ValueEnum>::from_str(value, true)
            .map_err(|_| anyhow::anyhow!("unknown mode `{}` (expected index, search or serve)", value))
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    pub region: String,
    pub index_host: String,
    pub index_name: String,
    pub signing_service: String,
    pub bot_id: Option<String>,
    pub bot_alias_id: Option<String>,
    pub locale_id: String,
    pub session_id: String,
    pub unique_sessions: bool,
    pub max_labels: i32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Photo indexing and natural-language photo search")]
pub struct Args {
    /// Runtime mode (overrides PHOTO_SEARCH_MODE)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Host to bind to in serve mode (overrides PHOTO_SEARCH_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to in serve mode (overrides PHOTO_SEARCH_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// AWS region for signing and clients (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Search domain host, or a full `scheme://host[:port]` URL (overrides PHOTO_SEARCH_INDEX_HOST)
    #[arg(long)]
    pub index_host: Option<String>,

    /// Index holding photo documents (overrides PHOTO_SEARCH_INDEX_NAME)
    #[arg(long)]
    pub index_name: Option<String>,

    /// Lex bot id (overrides PHOTO_SEARCH_BOT_ID)
    #[arg(long)]
    pub bot_id: Option<String>,

    /// Lex bot alias id (overrides PHOTO_SEARCH_BOT_ALIAS_ID)
    #[arg(long)]
    pub bot_alias_id: Option<String>,

    /// Lex locale (overrides PHOTO_SEARCH_LOCALE)
    #[arg(long)]
    pub locale: Option<String>,

    /// Fixed Lex session id (overrides PHOTO_SEARCH_SESSION_ID)
    #[arg(long)]
    pub session_id: Option<String>,

    /// Use a fresh Lex session per query instead of the fixed one
    #[arg(long)]
    pub unique_sessions: bool,

    /// Labels requested per image (overrides PHOTO_SEARCH_MAX_LABELS)
    #[arg(long)]
    pub max_labels: Option<i32>,
}

/// Values taken from the process environment; `None` where a variable is unset.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub mode: Option<Mode>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub region: Option<String>,
    pub index_host: Option<String>,
    pub index_name: Option<String>,
    pub signing_service: Option<String>,
    pub bot_id: Option<String>,
    pub bot_alias_id: Option<String>,
    pub locale: Option<String>,
    pub session_id: Option<String>,
    pub unique_sessions: Option<bool>,
    pub max_labels: Option<i32>,
}

/// Read and parse an env var; unset or empty yields `None`.
fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mode: env_parsed("PHOTO_SEARCH_MODE")?,
            host: env_string("PHOTO_SEARCH_HOST"),
            port: env_parsed("PHOTO_SEARCH_PORT")?,
            region: env_string("AWS_REGION"),
            index_host: env_string("PHOTO_SEARCH_INDEX_HOST"),
            index_name: env_string("PHOTO_SEARCH_INDEX_NAME"),
            signing_service: env_string("PHOTO_SEARCH_SIGNING_SERVICE"),
            bot_id: env_string("PHOTO_SEARCH_BOT_ID"),
            bot_alias_id: env_string("PHOTO_SEARCH_BOT_ALIAS_ID"),
            locale: env_string("PHOTO_SEARCH_LOCALE"),
            session_id: env_string("PHOTO_SEARCH_SESSION_ID"),
            unique_sessions: env_parsed("PHOTO_SEARCH_UNIQUE_SESSIONS")?,
            max_labels: env_parsed("PHOTO_SEARCH_MAX_LABELS")?,
        })
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::merge(Args::parse(), EnvConfig::from_env()?)
    }

    /// CLI args over environment over defaults.
    pub fn merge(args: Args, env: EnvConfig) -> Result<Self> {
        let index_host = match args.index_host.or(env.index_host) {
            Some(host) => host,
            None => bail!("search index host is required (--index-host or PHOTO_SEARCH_INDEX_HOST)"),
        };

        let cfg = Self {
            mode: args.mode.or(env.mode).unwrap_or(Mode::Serve),
            host: args.host.or(env.host).unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.or(env.port).unwrap_or(3000),
            region: args.region.or(env.region).unwrap_or_else(|| "us-east-1".into()),
            index_host,
            index_name: args
                .index_name
                .or(env.index_name)
                .unwrap_or_else(|| "photos".into()),
            signing_service: env.signing_service.unwrap_or_else(|| "es".into()),
            bot_id: args.bot_id.or(env.bot_id),
            bot_alias_id: args.bot_alias_id.or(env.bot_alias_id),
            locale_id: args.locale.or(env.locale).unwrap_or_else(|| "en_US".into()),
            session_id: args
                .session_id
                .or(env.session_id)
                .unwrap_or_else(|| "lambda-session".into()),
            unique_sessions: args.unique_sessions || env.unique_sessions.unwrap_or(false),
            max_labels: args
                .max_labels
                .or(env.max_labels)
                .unwrap_or(DEFAULT_MAX_LABELS),
        };

        if cfg.max_labels < 1 {
            bail!("max labels must be at least 1, got {}", cfg.max_labels);
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn signing_scope(&self) -> SigningScope {
        SigningScope {
            region: self.region.clone(),
            service: self.signing_service.clone(),
        }
    }

    /// Bot settings for the search handler; fails when the bot is not configured.
    pub fn bot_settings(&self) -> Result<BotSettings> {
        let (Some(bot_id), Some(bot_alias_id)) = (&self.bot_id, &self.bot_alias_id) else {
            bail!("bot id and bot alias id are required to serve search requests");
        };

        let session = if self.unique_sessions {
            SessionPolicy::PerInvocation
        } else {
            SessionPolicy::Fixed(self.session_id.clone())
        };

        Ok(BotSettings {
            bot_id: bot_id.clone(),
            bot_alias_id: bot_alias_id.clone(),
            locale_id: self.locale_id.clone(),
            session,
        })
    }
}

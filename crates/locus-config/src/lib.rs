//! Configuration for the locus capture service.
//!
//! TOML file + environment layering, credential resolution (env var, then
//! plaintext), validation, and translation to `locus_core::PipelineConfig`.
//! The binary loads this once at startup; nothing downstream re-reads it.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use locus_core::{GeocoderSettings, IpLocationSettings, PipelineConfig, TelegramSettings, Timeouts};

/// Prefix for environment overrides. Nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "LOCUS_";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Nominatim requires an identifying agent.
pub const DEFAULT_GEOCODER_USER_AGENT: &str = concat!(
    "locus/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/locus-rs/locus)"
);

const REDACTED: &str = "<redacted>";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {field}")]
    MissingCredential { field: String, hint: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Listen address for the inbound endpoint.
    pub bind: String,
    pub telegram: TelegramSection,
    pub ip2location: Ip2LocationSection,
    pub geocoder: GeocoderSection,
    pub timeouts: TimeoutSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            telegram: TelegramSection::default(),
            ip2location: Ip2LocationSection::default(),
            geocoder: GeocoderSection::default(),
            timeouts: TimeoutSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramSection {
    pub api_base: String,

    /// Bot token (plaintext; prefer `bot_token_env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Environment variable name containing the bot token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token_env: Option<String>,

    /// Recipient chat. Group ids are negative integers; either a TOML
    /// integer or a string is accepted.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_integer"
    )]
    pub chat_id: Option<String>,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_base: locus_api::telegram::DEFAULT_BASE_URL.into(),
            bot_token: None,
            bot_token_env: None,
            chat_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Ip2LocationSection {
    pub api_base: String,

    /// API key (plaintext; prefer `api_key_env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for Ip2LocationSection {
    fn default() -> Self {
        Self {
            api_base: locus_api::ip_location::DEFAULT_BASE_URL.into(),
            api_key: None,
            api_key_env: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocoderSection {
    pub api_base: String,
    pub user_agent: String,
}

impl Default for GeocoderSection {
    fn default() -> Self {
        Self {
            api_base: locus_api::geocoder::DEFAULT_BASE_URL.into(),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.into(),
        }
    }
}

/// Per-call timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutSection {
    pub lookup: u64,
    pub message: u64,
    pub upload: u64,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        let defaults = Timeouts::default();
        Self {
            lookup: defaults.lookup.as_secs(),
            message: defaults.message.as_secs(),
            upload: defaults.upload.as_secs(),
        }
    }
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
    }))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "locus", "locus").map_or_else(
        || PathBuf::from(".locus").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, the TOML file, and the environment.
///
/// With `path = None` the platform path is used and may be absent. An
/// explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(explicit) => {
            std::fs::metadata(explicit)?;
            explicit.to_path_buf()
        }
        None => config_path(),
    };

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve one secret: named env var first, then plaintext.
fn resolve_secret(
    field: &str,
    env_name: Option<&str>,
    plaintext: Option<&str>,
) -> Result<SecretString, ConfigError> {
    let from_env = env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty());

    let value = from_env.or_else(|| {
        plaintext
            .filter(|value| !value.trim().is_empty())
            .map(str::to_owned)
    });

    value.map(SecretString::from).ok_or_else(|| {
        let env_key = format!("{ENV_PREFIX}{}", field.replace('.', "__").to_uppercase());
        ConfigError::MissingCredential {
            field: field.into(),
            hint: format!("set `{field}`, point `{field}_env` at a variable, or export {env_key}"),
        }
    })
}

/// Resolve the Telegram bot token.
pub fn resolve_bot_token(telegram: &TelegramSection) -> Result<SecretString, ConfigError> {
    resolve_secret(
        "telegram.bot_token",
        telegram.bot_token_env.as_deref(),
        telegram.bot_token.as_deref(),
    )
}

/// Resolve the ip2location.io API key.
pub fn resolve_api_key(ip2location: &Ip2LocationSection) -> Result<SecretString, ConfigError> {
    resolve_secret(
        "ip2location.api_key",
        ip2location.api_key_env.as_deref(),
        ip2location.api_key.as_deref(),
    )
}

// ── Validation ──────────────────────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("{e}: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected an http(s) URL, got scheme '{other}'"),
        }),
    }
}

fn timeout(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

impl Config {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| ConfigError::Validation {
            field: "bind".into(),
            reason: format!("expected host:port, got '{}'", self.bind),
        })
    }
}

/// Validate the config and build the runtime `PipelineConfig`.
///
/// Missing credentials and a missing `chat_id` are errors; the service
/// must not start without them.
pub fn to_pipeline_config(cfg: &Config) -> Result<PipelineConfig, ConfigError> {
    let chat_id = cfg
        .telegram
        .chat_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential {
            field: "telegram.chat_id".into(),
            hint: format!("set `telegram.chat_id` or export {ENV_PREFIX}TELEGRAM__CHAT_ID"),
        })?;

    if cfg.geocoder.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "geocoder.user_agent".into(),
            reason: "Nominatim requires a non-empty User-Agent".into(),
        });
    }

    Ok(PipelineConfig {
        telegram: TelegramSettings {
            api_base: parse_url("telegram.api_base", &cfg.telegram.api_base)?,
            bot_token: resolve_bot_token(&cfg.telegram)?,
            chat_id: chat_id.to_owned(),
        },
        ip_location: IpLocationSettings {
            api_base: parse_url("ip2location.api_base", &cfg.ip2location.api_base)?,
            api_key: resolve_api_key(&cfg.ip2location)?,
        },
        geocoder: GeocoderSettings {
            api_base: parse_url("geocoder.api_base", &cfg.geocoder.api_base)?,
            user_agent: cfg.geocoder.user_agent.clone(),
        },
        timeouts: Timeouts {
            lookup: timeout("timeouts.lookup", cfg.timeouts.lookup)?,
            message: timeout("timeouts.message", cfg.timeouts.message)?,
            upload: timeout("timeouts.upload", cfg.timeouts.upload)?,
        },
    })
}

/// The merged config as TOML with plaintext secrets masked.
pub fn redacted_summary(cfg: &Config) -> Result<String, ConfigError> {
    let mut shown = cfg.clone();
    let mask = |secret: &mut Option<String>| {
        if secret.is_some() {
            *secret = Some(REDACTED.into());
        }
    };
    mask(&mut shown.telegram.bot_token);
    mask(&mut shown.ip2location.api_key);
    Ok(toml::to_string_pretty(&shown)?)
}

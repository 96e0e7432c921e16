// ── Runtime pipeline configuration ──
//
// Endpoints, credentials and timeouts for the three collaborators.
// Built once at startup by `locus-config` and handed to
// `Pipeline::from_config`; the core never reads files or environment.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Telegram Bot API delivery target.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: Url,
    pub bot_token: SecretString,
    /// Fixed recipient for every message and photo.
    pub chat_id: String,
}

/// ip2location.io lookup.
#[derive(Debug, Clone)]
pub struct IpLocationSettings {
    pub api_base: Url,
    pub api_key: SecretString,
}

/// Nominatim reverse geocoding.
#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    pub api_base: Url,
    /// Nominatim rejects requests without an identifying agent.
    pub user_agent: String,
}

/// Per-call timeouts. A timeout is an ordinary failure of that one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// IP lookup and reverse geocoding.
    pub lookup: Duration,
    /// Text message delivery.
    pub message: Duration,
    /// Each photo upload.
    pub upload: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            lookup: Duration::from_secs(8),
            message: Duration::from_secs(15),
            upload: Duration::from_secs(30),
        }
    }
}

/// Everything the pipeline needs to reach its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub telegram: TelegramSettings,
    pub ip_location: IpLocationSettings,
    pub geocoder: GeocoderSettings,
    pub timeouts: Timeouts,
}

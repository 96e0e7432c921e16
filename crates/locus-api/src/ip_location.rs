// IP-to-location client for the ip2location.io API.
//
// Base path: /
// Auth: `key` query parameter

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.ip2location.io";

// ── Wire shapes ──────────────────────────────────────────────────────

/// ip2location reports failures as `{"error": {...}}`, sometimes with HTTP 200.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorInner>,
}

#[derive(Deserialize)]
struct ErrorInner {
    error_code: Option<i64>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    country_code: Option<String>,
    country_name: Option<String>,
    region_name: Option<String>,
    city_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Usually a digit string, occasionally a bare number.
    asn: Option<Value>,
    #[serde(rename = "as")]
    as_name: Option<String>,
    is_proxy: Option<bool>,
}

// ── Public model ─────────────────────────────────────────────────────

/// Location and network-ownership data for one address.
///
/// Missing or `null` fields from the provider come through as empty
/// strings, zero coordinates, and `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IpLocation {
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Autonomous-system number as reported (`"7713"`).
    pub asn: String,
    /// Free-text autonomous-system field (`"AS7713 PT Example"`).
    pub as_name: String,
    pub is_proxy: bool,
}

impl From<RawLocation> for IpLocation {
    fn from(raw: RawLocation) -> Self {
        let asn = match raw.asn {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            country_code: raw.country_code.unwrap_or_default(),
            country_name: raw.country_name.unwrap_or_default(),
            region_name: raw.region_name.unwrap_or_default(),
            city_name: raw.city_name.unwrap_or_default(),
            latitude: raw.latitude.unwrap_or_default(),
            longitude: raw.longitude.unwrap_or_default(),
            asn,
            as_name: raw.as_name.unwrap_or_default(),
            is_proxy: raw.is_proxy.unwrap_or_default(),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the ip2location.io lookup endpoint.
pub struct Ip2LocationClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl Ip2LocationClient {
    /// Build a client with its own `reqwest::Client` from a `TransportConfig`.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, api_key)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Look up one client address.
    ///
    /// A trailing port is stripped before the request. An empty address
    /// fails with `Error::EmptyAddress` without touching the network.
    pub async fn lookup(&self, address: &str) -> Result<IpLocation, Error> {
        let ip = strip_port(address.trim());
        if ip.is_empty() {
            return Err(Error::EmptyAddress);
        }

        debug!(ip = %ip, "GET ip2location lookup");

        let resp = self
            .http
            .get(self.base_url.clone())
            .query(&[("key", self.api_key.expose_secret()), ("ip", ip.as_str())])
            .send()
            .await?;
        let resp = transport::check_status(resp).await?;
        let body = resp.text().await?;

        if let Ok(ErrorEnvelope { error: Some(err) }) = serde_json::from_str::<ErrorEnvelope>(&body) {
            let message = err.error_message.unwrap_or_default();
            return Err(Error::Provider {
                message: match err.error_code {
                    Some(code) => format!("ip2location error {code}: {message}"),
                    None => message,
                },
            });
        }

        let raw: RawLocation = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;
        Ok(raw.into())
    }
}

/// Strip a port from `host:port` or `[v6]:port`; anything else is returned as-is.
///
/// A bare IPv6 address is left untouched even though it contains colons.
pub fn strip_port(address: &str) -> String {
    if let Ok(sock) = address.parse::<SocketAddr>() {
        return sock.ip().to_string();
    }
    if address.parse::<IpAddr>().is_ok() {
        return address.to_owned();
    }
    match address.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host.to_owned()
        }
        _ => address.to_owned(),
    }
}

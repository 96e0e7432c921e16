// Reverse-geocoding client for Nominatim (OpenStreetMap).
//
// Base path: /reverse
// Auth: none, but the usage policy requires an identifying User-Agent.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Keys consulted for the city, highest priority first.
const CITY_KEYS: [&str; 4] = ["city", "town", "village", "county"];

/// Keys consulted for the region, highest priority first.
const REGION_KEYS: [&str; 2] = ["state", "region"];

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Map<String, Value>>,
}

/// Administrative names for a coordinate pair.
///
/// Any name the provider did not return is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
}

impl Place {
    /// Pick the fields the pipeline uses out of a free-form address map.
    pub fn from_address(address: &Map<String, Value>) -> Self {
        Self {
            country_code: first_str(address, &["country_code"]),
            country_name: first_str(address, &["country"]),
            region_name: first_str(address, &REGION_KEYS),
            city_name: first_str(address, &CITY_KEYS),
        }
    }
}

/// First key present with a string value.
fn first_str(address: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| address.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_owned()
}

/// Async client for the Nominatim `/reverse` endpoint.
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NominatimClient {
    /// Build a client from a `TransportConfig`. The config's user agent is
    /// sent on every request.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));
        Ok(Self { http, base_url })
    }

    /// Resolve a coordinate pair into administrative names.
    ///
    /// A response without an `address` object is not an error; it yields an
    /// empty `Place`.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, Error> {
        let url = self.base_url.join("reverse")?;
        debug!("GET {url} lat={latitude} lon={longitude}");

        let resp = self
            .http
            .get(url)
            .query(&[
                ("format", "jsonv2".to_owned()),
                ("lat", format!("{latitude:.6}")),
                ("lon", format!("{longitude:.6}")),
            ])
            .send()
            .await?;

        let body: ReverseResponse = transport::read_json(resp).await?;
        Ok(body
            .address
            .as_ref()
            .map(Place::from_address)
            .unwrap_or_default())
    }
}

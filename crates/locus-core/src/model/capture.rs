// ── Capture event ──
//
// One inbound submission: optional device coordinates, the requester's
// address, and zero or more encoded photos. Built once per request from
// the wire payload plus request metadata, then only read.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// `null` in the payload behaves like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Wire payload ─────────────────────────────────────────────────────

/// JSON body posted by the capture page.
///
/// Every field is optional. A zero coordinate pair means "no fix".
/// `userId`, `urlId` and `message` are accepted for compatibility and
/// otherwise unused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub image: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub camera: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub accuracy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    /// Nested fix sent by older capture pages.
    pub device_location: Option<LegacyDeviceLocation>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyDeviceLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub accuracy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
}

impl CapturePayload {
    /// Decode a request body. Anything that is not a JSON object of the
    /// expected shape is `CoreError::MalformedEvent`.
    pub fn from_json(body: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(body).map_err(|e| CoreError::MalformedEvent {
            reason: e.to_string(),
        })
    }
}

// ── Domain types ─────────────────────────────────────────────────────

/// A device fix. Only constructed for a non-zero coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

impl DeviceCoordinates {
    /// `None` when both coordinates are exactly zero.
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Option<Self> {
        (latitude != 0.0 || longitude != 0.0).then_some(Self {
            latitude,
            longitude,
            accuracy_meters,
        })
    }
}

/// Which path the capture page believes produced its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceHint {
    Gps,
    Ip,
    #[default]
    Unspecified,
}

impl SourceHint {
    /// Exact `"GPS"` / `"IP"`; anything else is unspecified.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "GPS" => Self::Gps,
            "IP" => Self::Ip,
            _ => Self::Unspecified,
        }
    }
}

/// Request facts captured by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// `X-Forwarded-For` as received, else the socket peer address.
    pub raw_client_address: String,
    pub user_agent: String,
    pub referer: String,
    /// Path and query of the inbound request.
    pub request_uri: String,
}

impl RequestMetadata {
    /// Referer when present, else the request URI.
    pub fn origin(&self) -> &str {
        if self.referer.is_empty() {
            &self.request_uri
        } else {
            &self.referer
        }
    }
}

/// One capture submission, ready for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureEvent {
    device_coordinates: Option<DeviceCoordinates>,
    legacy_device_location: Option<DeviceCoordinates>,
    source_hint: SourceHint,
    source_raw: String,
    client_address: String,
    photos: Vec<String>,
    camera_labels: Vec<String>,
    request: RequestMetadata,
}

impl CaptureEvent {
    pub fn from_payload(payload: CapturePayload, request: RequestMetadata) -> Self {
        let legacy_device_location = payload
            .device_location
            .and_then(|d| DeviceCoordinates::new(d.latitude, d.longitude, d.accuracy));

        Self {
            device_coordinates: DeviceCoordinates::new(
                payload.latitude,
                payload.longitude,
                payload.accuracy,
            ),
            legacy_device_location,
            source_hint: SourceHint::parse(&payload.source),
            source_raw: payload.source,
            client_address: normalize_client_address(&request.raw_client_address),
            photos: payload.image,
            camera_labels: payload.camera,
            request,
        }
    }

    pub fn device_coordinates(&self) -> Option<DeviceCoordinates> {
        self.device_coordinates
    }

    pub fn legacy_device_location(&self) -> Option<DeviceCoordinates> {
        self.legacy_device_location
    }

    pub fn source_hint(&self) -> SourceHint {
        self.source_hint
    }

    /// Normalized address used for IP lookups.
    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    /// Encoded photos in submission order (data URIs or bare base64).
    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    pub fn camera_labels(&self) -> &[String] {
        &self.camera_labels
    }

    pub fn request(&self) -> &RequestMetadata {
        &self.request
    }

    /// Label for the report's source line.
    ///
    /// The hint as sent; when absent, falls back on the legacy nested fix,
    /// which is what pages that omit `source` send.
    pub fn source_label(&self) -> &str {
        match self.source_raw.as_str() {
            "" if self.legacy_device_location.is_some() => "GPS",
            "" => "IP",
            raw => raw,
        }
    }
}

/// Reduce a raw client-address header to one lookup-ready address.
///
/// Takes the first `X-Forwarded-For` hop and strips any port.
pub fn normalize_client_address(raw: &str) -> String {
    let first_hop = raw.split(',').next().unwrap_or_default().trim();
    locus_api::ip_location::strip_port(first_hop)
}

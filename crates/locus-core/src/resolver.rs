// ── Location resolution ──
//
// Reconciles the device fix and the IP lookup into one estimate.
// Strategies are tried in `PRECEDENCE` order; the first one that applies
// owns the location fields. The IP lookup is then consulted for
// enrichment: it always supplies `NetworkInfo` and fills any field the
// winning strategy left unset.

use std::future::Future;

use locus_api::{Ip2LocationClient, IpLocation, NominatimClient, Place};
use strum::Display;
use tracing::{debug, warn};

use crate::model::{
    CaptureEvent, DeviceCoordinates, LocationEstimate, LocationSource, NetworkInfo, SourceHint,
};

// ── Collaborator seams ───────────────────────────────────────────────

/// Resolves a client address into location and ownership data.
pub trait IpLocator: Send + Sync {
    fn locate(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<IpLocation, locus_api::Error>> + Send;
}

/// Resolves a coordinate pair into administrative names.
pub trait ReverseGeocode: Send + Sync {
    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<Place, locus_api::Error>> + Send;
}

impl IpLocator for Ip2LocationClient {
    fn locate(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<IpLocation, locus_api::Error>> + Send {
        self.lookup(address)
    }
}

impl ReverseGeocode for NominatimClient {
    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<Place, locus_api::Error>> + Send {
        NominatimClient::reverse(self, latitude, longitude)
    }
}

// ── Precedence table ─────────────────────────────────────────────────

/// A named way of producing the location fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// Top-level fix with an explicit `GPS` hint.
    DeviceGps,
    /// Nested `deviceLocation` fix from older capture pages, any hint.
    LegacyDeviceGps,
    /// IP lookup of the client address. Always applies.
    IpLookup,
}

/// Strategies in the order they are tried.
pub const PRECEDENCE: [Strategy; 3] = [
    Strategy::DeviceGps,
    Strategy::LegacyDeviceGps,
    Strategy::IpLookup,
];

impl Strategy {
    /// The device fix this strategy would use, if it applies to `event`.
    /// `IpLookup` never has one.
    pub fn device_fix(self, event: &CaptureEvent) -> Option<DeviceCoordinates> {
        match self {
            Self::DeviceGps if event.source_hint() == SourceHint::Gps => {
                event.device_coordinates()
            }
            Self::LegacyDeviceGps => event.legacy_device_location(),
            Self::DeviceGps | Self::IpLookup => None,
        }
    }

    /// First strategy in `PRECEDENCE` that applies to `event`.
    pub fn select(event: &CaptureEvent) -> Self {
        PRECEDENCE
            .into_iter()
            .find(|s| *s == Self::IpLookup || s.device_fix(event).is_some())
            .unwrap_or(Self::IpLookup)
    }
}

// ── Per-request IP lookup ────────────────────────────────────────────

/// The request's single IP lookup, attempted on first use and reused after.
///
/// Both the `IpLookup` strategy and enrichment read from here, so a request
/// makes at most one call regardless of which strategy won.
struct RequestLookup<'a, I> {
    locator: &'a I,
    address: &'a str,
    outcome: Option<Option<IpLocation>>,
}

impl<'a, I: IpLocator> RequestLookup<'a, I> {
    fn new(locator: &'a I, address: &'a str) -> Self {
        Self {
            locator,
            address,
            outcome: None,
        }
    }

    async fn get(&mut self) -> Option<&IpLocation> {
        if self.outcome.is_none() {
            let result = match self.locator.locate(self.address).await {
                Ok(loc) => Some(loc),
                Err(e) => {
                    warn!(address = %self.address, error = %e, "IP lookup failed");
                    None
                }
            };
            self.outcome = Some(result);
        }
        self.outcome.as_ref().and_then(Option::as_ref)
    }
}

// ── Resolver ─────────────────────────────────────────────────────────

/// Produces a best-effort `LocationEstimate` and `NetworkInfo` for one event.
///
/// Never fails: collaborator errors are logged and leave fields unset.
pub struct LocationResolver<I, G> {
    ip: I,
    geocoder: G,
}

impl<I: IpLocator, G: ReverseGeocode> LocationResolver<I, G> {
    pub fn new(ip: I, geocoder: G) -> Self {
        Self { ip, geocoder }
    }

    pub async fn resolve(&self, event: &CaptureEvent) -> (LocationEstimate, NetworkInfo) {
        let mut lookup = RequestLookup::new(&self.ip, event.client_address());

        let strategy = Strategy::select(event);
        debug!(%strategy, "resolving location");

        let mut estimate = match strategy.device_fix(event) {
            Some(fix) => self.resolve_device_fix(fix).await,
            None => lookup
                .get()
                .await
                .map(LocationEstimate::from_ip)
                .unwrap_or_default(),
        };

        let network = match lookup.get().await {
            Some(loc) => {
                estimate.backfill_from(loc);
                NetworkInfo::from_lookup(loc)
            }
            None => NetworkInfo::default(),
        };

        (estimate, network)
    }

    /// GPS path: coordinates come from the device verbatim, names from the
    /// geocoder when it answers.
    async fn resolve_device_fix(&self, fix: DeviceCoordinates) -> LocationEstimate {
        let mut estimate = LocationEstimate {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_meters: fix.accuracy_meters,
            source: LocationSource::Gps,
            ..LocationEstimate::default()
        };

        match self.geocoder.reverse(fix.latitude, fix.longitude).await {
            Ok(place) => estimate.set_place(place),
            Err(e) => warn!(
                lat = fix.latitude,
                lon = fix.longitude,
                error = %e,
                "reverse geocoding failed"
            ),
        }

        estimate
    }
}

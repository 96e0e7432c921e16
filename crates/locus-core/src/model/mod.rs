// ── Domain model ──
//
// Request-scoped values flowing through the pipeline. Nothing here is
// persisted or shared between requests.

pub mod capture;
pub mod location;
pub mod network;

pub use capture::{
    CaptureEvent, CapturePayload, DeviceCoordinates, LegacyDeviceLocation, RequestMetadata,
    SourceHint, normalize_client_address,
};
pub use location::{LocationEstimate, LocationSource};
pub use network::NetworkInfo;

// locus-core: Capture-event pipeline between the HTTP surface and locus-api.
//
// An event is resolved to a best-effort location, rendered into a fixed
// report, and delivered as one text message followed by its photos.

pub mod config;
pub mod delivery;
pub mod error;
pub mod model;
pub mod network_info;
pub mod pipeline;
pub mod report;
pub mod resolver;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{GeocoderSettings, IpLocationSettings, PipelineConfig, TelegramSettings, Timeouts};
pub use delivery::{DeliveryResult, ItemOutcome, Messenger, NotificationDelivery};
pub use error::CoreError;
pub use pipeline::{LivePipeline, Pipeline, ProcessOutcome};
pub use report::{NotificationReport, ReportComposer};
pub use resolver::{IpLocator, LocationResolver, ReverseGeocode, Strategy};

pub use model::{
    CaptureEvent, CapturePayload, LocationEstimate, LocationSource, NetworkInfo, RequestMetadata,
};

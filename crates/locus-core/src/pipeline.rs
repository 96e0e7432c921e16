// ── Capture pipeline ──
//
// resolve → compose → deliver, once per event. Every collaborator failure
// is absorbed by the stage that hit it, so `process` itself cannot fail.

use chrono::{DateTime, Utc};
use locus_api::{Ip2LocationClient, NominatimClient, TelegramClient, TransportConfig};
use tracing::info;

use crate::config::PipelineConfig;
use crate::delivery::{DeliveryResult, Messenger, NotificationDelivery};
use crate::error::CoreError;
use crate::model::{CaptureEvent, LocationEstimate, NetworkInfo};
use crate::report::ReportComposer;
use crate::resolver::{IpLocator, LocationResolver, ReverseGeocode};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub estimate: LocationEstimate,
    pub network: NetworkInfo,
    pub delivery: DeliveryResult,
}

/// The three stages wired together. Shared across requests; holds no
/// per-request state.
pub struct Pipeline<I, G, M> {
    resolver: LocationResolver<I, G>,
    composer: ReportComposer,
    delivery: NotificationDelivery<M>,
}

/// Pipeline backed by the real HTTP collaborators.
pub type LivePipeline = Pipeline<Ip2LocationClient, NominatimClient, TelegramClient>;

impl<I: IpLocator, G: ReverseGeocode, M: Messenger> Pipeline<I, G, M> {
    pub fn new(ip: I, geocoder: G, messenger: M) -> Self {
        Self {
            resolver: LocationResolver::new(ip, geocoder),
            composer: ReportComposer,
            delivery: NotificationDelivery::new(messenger),
        }
    }

    /// Process one event, timestamping the report with the current time.
    pub async fn process(&self, event: &CaptureEvent) -> ProcessOutcome {
        self.process_at(event, Utc::now()).await
    }

    /// Process one event with an explicit report timestamp.
    pub async fn process_at(&self, event: &CaptureEvent, now: DateTime<Utc>) -> ProcessOutcome {
        let (estimate, network) = self.resolver.resolve(event).await;
        let report = self.composer.compose(event, &estimate, &network, now);
        let delivery = self.delivery.deliver(&report).await;

        info!(
            source = %estimate.source,
            client = %event.client_address(),
            photos = event.photos().len(),
            %delivery,
            "capture processed"
        );

        ProcessOutcome {
            estimate,
            network,
            delivery,
        }
    }
}

impl LivePipeline {
    /// Build the HTTP clients from a resolved configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, CoreError> {
        if config.telegram.chat_id.trim().is_empty() {
            return Err(CoreError::Config {
                message: "telegram chat_id is empty".into(),
            });
        }
        let timeouts = config.timeouts;

        let ip = Ip2LocationClient::new(
            config.ip_location.api_base.as_str(),
            config.ip_location.api_key.clone(),
            &TransportConfig::with_timeout(timeouts.lookup),
        )?;

        let geocoder = NominatimClient::new(
            config.geocoder.api_base.as_str(),
            &TransportConfig::with_timeout(timeouts.lookup)
                .user_agent(config.geocoder.user_agent.clone()),
        )?;

        let messenger = TelegramClient::new(
            config.telegram.api_base.as_str(),
            config.telegram.bot_token.clone(),
            config.telegram.chat_id.clone(),
            &TransportConfig::with_timeout(timeouts.message),
            timeouts.upload,
        )?;

        Ok(Self::new(ip, geocoder, messenger))
    }
}

// ── Notification delivery ──
//
// Sends the report text, then each photo, as independent items. A failure
// on one item is logged and recorded; it never stops the items after it.

use std::fmt;
use std::future::Future;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use locus_api::TelegramClient;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::report::NotificationReport;

/// Delivers text and photos to the fixed recipient.
pub trait Messenger: Send + Sync {
    fn send_text(&self, text: &str) -> impl Future<Output = Result<(), locus_api::Error>> + Send;

    fn send_photo(&self, photo: Vec<u8>)
    -> impl Future<Output = Result<(), locus_api::Error>> + Send;
}

impl Messenger for TelegramClient {
    fn send_text(&self, text: &str) -> impl Future<Output = Result<(), locus_api::Error>> + Send {
        self.send_message(text)
    }

    fn send_photo(
        &self,
        photo: Vec<u8>,
    ) -> impl Future<Output = Result<(), locus_api::Error>> + Send {
        TelegramClient::send_photo(self, photo)
    }
}

/// Result of delivering one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Delivered,
    /// Empty photo entry; nothing to send.
    Skipped,
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-item tally for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub message: ItemOutcome,
    /// One entry per photo, in report order.
    pub photos: Vec<ItemOutcome>,
}

impl DeliveryResult {
    fn items(&self) -> impl Iterator<Item = &ItemOutcome> {
        std::iter::once(&self.message).chain(&self.photos)
    }

    pub fn delivered(&self) -> usize {
        self.items().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.items().filter(|o| o.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.photos
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Skipped))
            .count()
    }

    /// No item failed.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} delivered, {} failed, {} skipped",
            self.delivered(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Strip a leading data-URI prefix (through the first comma) and decode
/// the base64 remainder. `index` is 1-based and only used for the error.
pub fn decode_photo(index: usize, encoded: &str) -> Result<Vec<u8>, CoreError> {
    let payload = encoded
        .split_once(',')
        .map_or(encoded, |(_, data)| data);

    STANDARD
        .decode(payload.trim())
        .map_err(|e| CoreError::PhotoDecode {
            index,
            reason: e.to_string(),
        })
}

/// Sends a `NotificationReport` through a `Messenger`.
pub struct NotificationDelivery<M> {
    messenger: M,
}

impl<M: Messenger> NotificationDelivery<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    pub async fn deliver(&self, report: &NotificationReport<'_>) -> DeliveryResult {
        let message = match self.messenger.send_text(report.text()).await {
            Ok(()) => ItemOutcome::Delivered,
            Err(e) => {
                warn!(error = %e, "report message delivery failed");
                ItemOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let mut photos = Vec::with_capacity(report.photos().len());
        for (i, encoded) in report.photos().iter().enumerate() {
            photos.push(self.deliver_photo(i + 1, encoded).await);
        }

        let result = DeliveryResult { message, photos };
        info!(%result, "delivery attempted");
        result
    }

    async fn deliver_photo(&self, index: usize, encoded: &str) -> ItemOutcome {
        if encoded.is_empty() {
            debug!(photo = index, "empty photo entry skipped");
            return ItemOutcome::Skipped;
        }

        let bytes = match decode_photo(index, encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(photo = index, error = %e, "photo decode failed");
                return ItemOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.messenger.send_photo(bytes).await {
            Ok(()) => ItemOutcome::Delivered,
            Err(e) => {
                warn!(photo = index, error = %e, "photo upload failed");
                ItemOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

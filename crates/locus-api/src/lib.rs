// locus-api: Async clients for the external services behind the capture pipeline

pub mod error;
pub mod geocoder;
pub mod ip_location;
pub mod telegram;
pub mod transport;

pub use error::Error;
pub use geocoder::{NominatimClient, Place};
pub use ip_location::{Ip2LocationClient, IpLocation};
pub use telegram::TelegramClient;
pub use transport::TransportConfig;

use thiserror::Error;

/// Top-level error type for the `locus-api` crate.
///
/// Covers every failure mode of the three collaborators: transport,
/// provider-reported errors, and payload decoding. `locus-core` treats all
/// of these as "no data" or "not delivered" and never lets them escape the
/// pipeline.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    ///
    /// The request URL is stripped on conversion; it carries credentials.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    // ── Provider ────────────────────────────────────────────────────
    /// Non-2xx response from a provider.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Error envelope returned with a successful HTTP status.
    #[error("Provider error: {message}")]
    Provider { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// An IP lookup was requested for an empty address.
    #[error("Client address is empty")]
    EmptyAddress,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl Error {
    /// Returns `true` if the request ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

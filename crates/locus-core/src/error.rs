// ── Core error types ──
//
// Only malformed input and construction failures are errors here.
// Collaborator failures (lookup, geocoding, delivery) are logged and
// degrade the result instead; they never surface as `CoreError`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Malformed capture event: {reason}")]
    MalformedEvent { reason: String },

    #[error("Photo {index} is not valid base64: {reason}")]
    PhotoDecode { index: usize, reason: String },

    // ── Construction errors ──────────────────────────────────────────
    #[error("Failed to build collaborator client: {0}")]
    Client(#[from] locus_api::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with
//! actionable help text and a process exit code.

use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

use locus_config::ConfigError;
use locus_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const SERVER: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing {field}")]
    #[diagnostic(code(locus::missing_credential), help("{hint}"))]
    MissingCredential { field: String, hint: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(locus::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration file could not be read")]
    #[diagnostic(
        code(locus::config_file),
        help(
            "Pass an existing file with --config, or drop the flag to use\n\
             the default location ({default_path})."
        )
    )]
    ConfigFile {
        default_path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(locus::config))]
    Config(Box<figment::Error>),

    #[error("Could not render the configuration summary: {message}")]
    #[diagnostic(code(locus::summary))]
    Summary { message: String },

    // ── Startup ──────────────────────────────────────────────────────
    #[error("Could not build the collaborator clients")]
    #[diagnostic(
        code(locus::client),
        help("Check the api_base URLs in the [telegram], [ip2location] and [geocoder] sections.")
    )]
    Client {
        #[source]
        source: CoreError,
    },

    // ── Server ───────────────────────────────────────────────────────
    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(locus::bind),
        help("Is another process using this port? Override with --bind or `bind` in the config.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server stopped unexpectedly")]
    #[diagnostic(code(locus::serve))]
    Serve(#[source] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredential { .. }
            | Self::Validation { .. }
            | Self::ConfigFile { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Bind { .. } | Self::Serve(_) => exit_code::SERVER,
            Self::Summary { .. } | Self::Client { .. } => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingCredential { field, hint } => Self::MissingCredential { field, hint },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(source) => Self::ConfigFile {
                default_path: locus_config::config_path().display().to_string(),
                source,
            },
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Serialization(err) => Self::Summary {
                message: err.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(source: CoreError) -> Self {
        Self::Client { source }
    }
}

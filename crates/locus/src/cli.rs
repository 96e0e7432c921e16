//! Clap derive structures for the `locus` binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// locus -- receive capture events and forward location reports
#[derive(Debug, Parser)]
#[command(
    name = "locus",
    version,
    about = "Receive capture events and forward location reports to Telegram",
    long_about = "Accepts capture submissions over HTTP, resolves a best-effort location\n\
        from the device fix and an IP lookup, and delivers a text report plus\n\
        the submitted photos to a fixed Telegram chat.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "LOCUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the capture endpoint
    Serve(ServeArgs),

    /// Validate configuration and print a redacted summary
    Check,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides `bind` from the config)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

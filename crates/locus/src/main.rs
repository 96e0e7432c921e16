mod cli;
mod error;
mod server;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use locus_config::Config;
use locus_core::LivePipeline;

use crate::cli::{Cli, Command, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = locus_config::load_config(cli.global.config.as_deref())?;

    match cli.command {
        Command::Serve(args) => {
            // Credentials are checked before anything binds.
            let pipeline_config = locus_config::to_pipeline_config(&cfg)?;
            let addr = match args.bind {
                Some(addr) => addr,
                None => cfg.bind_addr()?,
            };

            let pipeline = LivePipeline::from_config(&pipeline_config)?;
            tracing::debug!(chat_id = %pipeline_config.telegram.chat_id, "pipeline ready");
            server::serve(addr, pipeline).await
        }
        Command::Check => check(&cfg, &cli.global),
    }
}

/// Validate everything `serve` would, then print the merged config.
fn check(cfg: &Config, global: &cli::GlobalOpts) -> Result<(), CliError> {
    locus_config::to_pipeline_config(cfg)?;
    cfg.bind_addr()?;

    let source = global
        .config
        .clone()
        .unwrap_or_else(locus_config::config_path);
    println!("# config: {}", source.display());
    print!("{}", locus_config::redacted_summary(cfg)?);
    println!("# ok");
    Ok(())
}

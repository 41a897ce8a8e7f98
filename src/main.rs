use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

use drs_pulse::drs::config::BEARER_TOKEN_OPTION;
use drs_pulse::{DrsConfig, DrsPathBuilderFactory, WorkflowOptions};

/// Resolve a DRS uri and stream the object to stdout
#[derive(Parser, Debug)]
#[command(name = "drs-pulse", version)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: PathBuf,

    /// Bearer token passed to the resolver
    #[arg(long, env = "DRS_BEARER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// drs:// or dos:// uri to read
    uri: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize tracing, logging to stderr so stdout carries only object bytes
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting DRS Pulse uri={}", args.uri);

    let config = DrsConfig::from_json_file(&args.config)?;
    let factory = DrsPathBuilderFactory::new(config)?;

    let mut options = WorkflowOptions::new();
    if let Some(token) = args.token {
        options = options.with_option(BEARER_TOKEN_OPTION, token);
    }

    let builder = factory.build(&options).await?;
    let channel = builder.open_uri(&args.uri).await?;
    let location = channel.location().to_string();

    let mut reader = channel.into_async_read();
    let mut stdout = tokio::io::stdout();
    let copied = tokio::io::copy(&mut reader, &mut stdout).await?;

    info!("Read uri={}, location={}, bytes={}", args.uri, location, copied);
    Ok(())
}

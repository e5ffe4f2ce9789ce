//! cfapi - command-line front end to the Cloudflare API client

mod cli;
mod output;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands, Context};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut config = cfapi::Config::load()?;
    if let Some(format) = cli.format.as_deref() {
        config.output_format = cfapi::OutputFormat::parse(format);
    }

    // Ctrl-C cancels whatever request is in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let ctx = Context::new(config, cli.account, cancel)?;

    let result = match cli.command {
        Commands::Lists(args) => cli::lists::execute(&ctx, args).await,
        Commands::Access(args) => cli::access::execute(&ctx, args).await,
        Commands::Members(args) => cli::members::execute(&ctx, args).await,
        Commands::Kv(args) => cli::kv::execute(&ctx, args).await,
        Commands::Raw(args) => cli::raw::execute(&ctx, args).await,
    };

    if let Err(err) = &result {
        if let Some(ray_id) = err
            .downcast_ref::<cfapi::Error>()
            .and_then(cfapi::Error::ray_id)
        {
            output::warning(&format!("ray id: {}", ray_id));
        }
    }
    result
}

//! dcim-sync - reconcile NetBox DCIM manufacturers from a manifest.
//!
//! Prints the batch result as JSON on stdout; logs go to stderr.

use clap::Parser;
use dcim_sync::error::{EXIT_ITEM_FAILED, EXIT_OK};
use dcim_sync::{run, Args};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads env-backed flags
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.verbose {
        "dcim_sync=debug,dcim_sync_engine=debug"
    } else {
        "dcim_sync=info,dcim_sync_engine=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run(&args)
        .await
        .and_then(|batch| Ok((serde_json::to_string_pretty(&batch)?, batch.failed)));

    match result {
        Ok((json, failed)) => {
            println!("{json}");
            if failed {
                tracing::warn!("one or more items failed");
                ExitCode::from(EXIT_ITEM_FAILED)
            } else {
                ExitCode::from(EXIT_OK)
            }
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

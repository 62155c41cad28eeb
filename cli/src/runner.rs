//! Command-line arguments and the batch run they describe.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::manifest::Manifest;
use crate::netbox::NetBoxClient;
use clap::Parser;
use dcim_sync_engine::{
    BatchOptions, BatchResult, InventorySnapshot, MemoryInventory, Reconciler, Stage,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Reconcile NetBox manufacturers against a manifest
#[derive(Debug, Clone, Parser)]
#[command(name = "dcim-sync")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Manifest file (YAML, or JSON when it ends in .json)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Requested state: merged, override, absent or gathered
    #[arg(long)]
    pub state: Option<Stage>,

    /// Check mode: report what would change without writing
    #[arg(long)]
    pub check: bool,

    /// Number of items reconciled at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Stop starting new items after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Reconcile against an inventory snapshot instead of NetBox
    #[arg(long, value_name = "SNAPSHOT")]
    pub offline: Option<PathBuf>,

    /// With --offline, write the resulting inventory to this file
    #[arg(long, value_name = "PATH", requires = "offline")]
    pub save_snapshot: Option<PathBuf>,

    /// NetBox base URL
    #[arg(long, env = "NETBOX_API_URL")]
    pub netbox_url: Option<String>,

    /// NetBox API token
    #[arg(long, env = "NETBOX_API_TOKEN", hide_env_values = true)]
    pub netbox_token: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    fn batch_options(&self) -> Result<BatchOptions> {
        if self.concurrency == 0 {
            return Err(AppError::Usage("--concurrency must be at least 1".into()));
        }
        Ok(BatchOptions {
            simulate: self.check,
            concurrency: self.concurrency,
            fail_fast: self.fail_fast,
        })
    }
}

/// Load the manifest and reconcile it.
///
/// Only setup problems are returned as errors; item failures are part of
/// the [`BatchResult`].
pub async fn run(args: &Args) -> Result<BatchResult> {
    let options = args.batch_options()?;
    let manifest = Manifest::load(&args.manifest)?;
    let stage = args.state.or(manifest.state).unwrap_or_default();

    info!(
        manifest = %args.manifest.display(),
        %stage,
        items = manifest.manufacturers.len(),
        check = options.simulate,
        "starting sync"
    );

    match &args.offline {
        Some(path) => {
            let inventory = MemoryInventory::from_snapshot(read_snapshot(path)?);
            let batch = Reconciler::new(&inventory, &inventory)
                .run_batch(&manifest.manufacturers, stage, &options)
                .await;
            if let Some(out) = &args.save_snapshot {
                let json = inventory.snapshot().to_json_pretty()?;
                std::fs::write(out, json).map_err(|e| AppError::io(out, e))?;
                info!(path = %out.display(), "saved inventory snapshot");
            }
            Ok(batch)
        }
        None => {
            let config = Config::from_env_with(args.netbox_url.clone(), args.netbox_token.clone())?;
            info!(netbox = %config.netbox_url, "connecting to NetBox");
            let client = NetBoxClient::new(&config)?;
            Ok(Reconciler::new(&client, &client)
                .run_batch(&manifest.manufacturers, stage, &options)
                .await)
        }
    }
}

fn read_snapshot(path: &Path) -> Result<InventorySnapshot> {
    let json = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(InventorySnapshot::from_json(&json)?)
}

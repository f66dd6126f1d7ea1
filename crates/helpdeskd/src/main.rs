//! helpdeskd - IT service desk daemon

use anyhow::{Context, Result};
use clap::Parser;
use helpdeskd::cli::Args;
use helpdeskd::config::{Config, StorageBackend};
use helpdeskd::store::Repositories;
use helpdeskd::{seed, server, AppState, Desk};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_config {
        Config::save_default(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    // Read before the subscriber exists; the outcome is logged below
    let loaded = Config::load(args.config.as_deref());
    let level = match &loaded {
        Ok(config) => config.log.level.clone(),
        Err(_) => Config::default().log.level,
    };

    // RUST_LOG wins over the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("helpdeskd v{} starting", helpdesk_shared::VERSION);
    let config = match loaded {
        Ok(config) => {
            match &config.source {
                Some(path) => info!("  Config: {}", path.display()),
                None => info!("  No config file found, using defaults"),
            }
            config
        }
        Err(e) => {
            warn!("  Config unusable, using defaults: {:#}", e);
            Config::default()
        }
    };

    let repos = match config.storage.backend {
        StorageBackend::File => {
            info!("  Storage: {}", config.storage.data_dir.display());
            Repositories::open_json(&config.storage.data_dir).with_context(|| {
                format!("Failed to open {}", config.storage.data_dir.display())
            })?
        }
        StorageBackend::Memory => {
            info!("  Storage: in-memory (data is lost on exit)");
            Repositories::memory()
        }
    };

    if config.storage.seed_defaults {
        seed::seed_defaults(&repos, &config.zoom_accounts).context("Failed to seed defaults")?;
    }

    let hours = config.booking.working_hours();
    info!("  Booking window {}-{}", hours.start, hours.end);

    let state = AppState::new(Desk::new(repos, hours));
    server::run(state, &config.server.bind_addr).await
}

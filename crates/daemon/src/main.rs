//! meshgate daemon - Main Entry Point
//!
//! Composition root: loads settings, wires the local subsystems into the
//! service registry and serves it on every enabled transport until Ctrl+C or
//! an API shutdown request.

mod logging;
mod settings;

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use meshgate_api_rpc::{BuildInfo, RpcServer, ServiceRegistry, Subsystems};
use meshgate_core::application::{resolve, shutdown_channel, PostSetupController, ProgressHub};
use meshgate_core::domain::{Address, JobState};
use meshgate_core::port::time_provider::SystemTimeProvider;
use meshgate_core::port::SmeshingControl;
use meshgate_infra_local::{LayerClock, LocalPostBackend, LocalSmeshing, StandaloneNode};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    let _log_guard = logging::init()?;
    let build = BuildInfo::default();
    info!(version = %build.version, commit = %build.commit, "meshgate starting");

    // 2. Configuration
    let settings = Settings::load()?;
    let activation = resolve(&settings.api).context("invalid API configuration")?;
    info!(
        services = ?activation.services().collect::<Vec<_>>(),
        transports = activation.transports().len(),
        "API activation resolved"
    );

    let (shutdown_tx, shutdown_token) = shutdown_channel();

    // 3. Local subsystems
    let clock = Arc::new(
        LayerClock::new(
            settings.clock.genesis_time.unwrap_or_else(Utc::now),
            Duration::from_secs(settings.clock.layer_duration_secs),
            settings.clock.layers_per_epoch,
            Arc::new(SystemTimeProvider),
        )
        .context("invalid clock settings")?,
    );

    let node = Arc::new(StandaloneNode::new());
    let mesh_task = {
        let node = node.clone();
        let clock = clock.clone();
        let token = shutdown_token.clone();
        tokio::spawn(async move { node.follow_clock(clock, token).await })
    };

    let coinbase = match &settings.smesher.coinbase {
        Some(hex) => hex.parse::<Address>().context("invalid smesher.coinbase")?,
        None => Address::default(),
    };
    let smeshing = Arc::new(LocalSmeshing::with_random_identity(coinbase));
    info!(smesher_id = %smeshing.smesher_id().to_hex(), "Smesher identity ready");

    let backend = Arc::new(LocalPostBackend::new(settings.post.local_config()));
    let post = Arc::new(PostSetupController::with_hub(
        backend,
        ProgressHub::new(settings.post.subscriber_capacity),
    ));

    // 4. Services
    let subsystems = Subsystems {
        network: Some(node.clone()),
        syncer: Some(node.clone()),
        ledger: Some(node.clone()),
        clock: Some(clock.clone()),
        process: Some(Arc::new(shutdown_tx.clone())),
        smeshing: Some(smeshing),
        post: Some(post.clone()),
    };
    let module = ServiceRegistry::build(&activation, &subsystems, build, shutdown_token.clone())?
        .into_module()?;

    // 5. Transports
    let server = RpcServer::new(&activation).start(module).await?;
    info!("System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    let mut api_shutdown = shutdown_token.clone();
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl+C")?;
            info!("Shutdown signal received. Exiting gracefully...");
        }
        _ = api_shutdown.wait() => {
            info!("Shutdown requested through the API");
        }
    }

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    server.stop().await;

    if post.status().state == JobState::Running {
        if let Err(e) = post.stop(false).await {
            warn!(error = %e, "Failed to stop PoST data creation");
        }
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), mesh_task).await;

    info!("Shutdown complete.");
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use secret_mounter::config::Config;
use secret_mounter::constants::OPERATOR_NAME;
use secret_mounter::events::{resync, DeploymentWatcher, Dispatcher};
use secret_mounter::kubernetes::{connect, KubeAccessor};
use secret_mounter::queue::WorkQueue;
use secret_mounter::reconcilers::ReconcileDriver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting {} controller", OPERATOR_NAME);

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: workers={}, default_mount_path={}, bulk_selector={}, watch_namespace={}",
        config.workers,
        config.default_mount_path,
        config.bulk_selector,
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );

    // Failing to reach the API server is fatal
    let client = connect().await?;

    let queue: WorkQueue<String> = WorkQueue::default();
    let (dispatcher, handle) = Dispatcher::new(queue.clone());
    let (watcher, store) = DeploymentWatcher::new(client.clone(), &config, handle.clone());

    let resync_task = config
        .resync_interval
        .map(|interval| tokio::spawn(resync(store.clone(), handle.clone(), interval)));
    drop(handle);
    let watch_task = tokio::spawn(watcher.run());
    let dispatch_task = tokio::spawn(dispatcher.run());

    info!("Waiting for the deployment cache to sync...");
    tokio::select! {
        ready = store.wait_until_ready() => ready.context("Deployment watch stopped before the cache synced")?,
        _ = shutdown_signal() => {
            info!("Shutdown requested before the cache synced");
            return Ok(());
        }
    }
    info!("Deployment cache synced");

    let driver = ReconcileDriver::new(KubeAccessor::new(client, store), queue.clone(), config);
    let workers = tokio::spawn(driver.run());

    shutdown_signal().await;
    info!("Shutting down, waiting for in-flight reconciliations...");

    // Stop the event source, then release the workers
    watch_task.abort();
    if let Some(task) = resync_task {
        task.abort();
    }
    queue.shut_down();
    dispatch_task.abort();

    if let Err(e) = workers.await? {
        warn!("Workers stopped with an error: {}", e);
    }

    info!("{} stopped", OPERATOR_NAME);
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let Ok(mut terminate) = signal(SignalKind::terminate()) else {
        warn!("Failed to listen to terminate signal");
        return;
    };
    let Ok(mut interrupt) = signal(SignalKind::interrupt()) else {
        warn!("Failed to listen to interrupt signal");
        return;
    };

    tokio::select! {
        _ = terminate.recv() => info!("Received SIGTERM"),
        _ = interrupt.recv() => info!("Received SIGINT"),
    };
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen to ctrl_c signal: {}", e);
    }
}

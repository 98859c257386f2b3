// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment watch feeding the local cache and the event channel.

use super::dispatcher::EventHandle;
use crate::config::Config;
use crate::types::ObjectKey;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    runtime::{
        reflector::{self, store::Writer, Store},
        watcher, WatchStreamExt,
    },
    Api, Client,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Watches deployments, keeps the reflector store current and announces every
/// created or updated deployment. Deletions only update the store.
pub struct DeploymentWatcher {
    api: Api<Deployment>,
    writer: Writer<Deployment>,
    handle: EventHandle,
}

impl DeploymentWatcher {
    /// Create the watcher and the store it maintains. The store reports ready
    /// once the initial list has been received.
    pub fn new(client: Client, config: &Config, handle: EventHandle) -> (Self, Store<Deployment>) {
        let api: Api<Deployment> = match &config.watch_namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::all(client),
        };
        let (reader, writer) = reflector::store();

        (Self { api, writer, handle }, reader)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            api,
            writer,
            handle,
        } = self;

        info!("Starting deployment watch");
        let stream = reflector::reflector(
            writer,
            watcher(api, WatcherConfig::default()).default_backoff(),
        )
        .applied_objects();
        futures::pin_mut!(stream);

        while let Some(event) = stream.next().await {
            match event {
                Ok(deployment) => handle.send(ObjectKey::queue_key(&deployment)).await,
                Err(e) => warn!("Deployment watch error: {}", e),
            }
        }

        warn!("Deployment watch ended");
        Ok(())
    }
}

/// Periodically announce every cached deployment, so that state missed by the
/// watch or dropped after too many retries is reconciled again.
pub async fn resync(
    store: Store<Deployment>,
    handle: EventHandle,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; the initial list already enqueued everything
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let deployments = store.state();
        debug!("Resync: enqueueing {} deployments", deployments.len());
        for deployment in deployments {
            handle.send(ObjectKey::queue_key(deployment.as_ref())).await;
        }
    }
}

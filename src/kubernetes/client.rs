// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API server client creation

use anyhow::{Context, Result};
use kube::{Client, Config as KConfig};
use tracing::{debug, info};

/// Create a client from the in-cluster or kubeconfig environment and verify
/// the API server answers. Any failure here is fatal for the operator.
pub async fn connect() -> Result<Client> {
    let config = KConfig::infer()
        .await
        .context("Failed to infer Kubernetes client configuration")?;
    debug!("Using API server at {}", config.cluster_url);

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

    let version = client
        .apiserver_version()
        .await
        .context("Failed to reach the Kubernetes API server")?;
    info!(
        "Connected to Kubernetes API server {}.{} ({})",
        version.major, version.minor, version.git_version
    );

    Ok(client)
}


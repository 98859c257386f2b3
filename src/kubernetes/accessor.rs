// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read and write access to deployments and secrets.
//!
//! Cached reads come from the reflector store fed by the deployment watcher;
//! everything else goes straight to the API server.

use crate::error::{MounterError, Result};
use crate::types::ObjectKey;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ListParams, PostParams},
    runtime::reflector::{ObjectRef, Store},
    Api, Client,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[async_trait]
pub trait ResourceAccessor: Send + Sync {
    /// Deployment as last seen by the watch cache, possibly stale
    fn get_cached_deployment(&self, key: &ObjectKey) -> Option<Arc<Deployment>>;

    /// Deployment as currently stored by the API server
    async fn get_live_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>>;

    /// Replace a deployment. Fails with `MounterError::Conflict` when it changed
    /// since `deployment` was read.
    async fn update_deployment(&self, key: &ObjectKey, deployment: &Deployment)
        -> Result<Deployment>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// Secrets in `namespace` matching the label `selector`
    async fn list_secrets(&self, namespace: &str, selector: &str) -> Result<Vec<Secret>>;
}

/// `ResourceAccessor` backed by the Kubernetes API and a deployment reflector store
#[derive(Clone)]
pub struct KubeAccessor {
    client: Client,
    deployments: Store<Deployment>,
}

impl KubeAccessor {
    pub fn new(client: Client, deployments: Store<Deployment>) -> Self {
        Self {
            client,
            deployments,
        }
    }
}

#[async_trait]
impl ResourceAccessor for KubeAccessor {
    fn get_cached_deployment(&self, key: &ObjectKey) -> Option<Arc<Deployment>> {
        self.deployments
            .get(&ObjectRef::new(&key.name).within(&key.namespace))
    }

    #[instrument(skip(self), fields(deployment = %key))]
    async fn get_live_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &key.namespace);
        Ok(deployments.get_opt(&key.name).await?)
    }

    #[instrument(skip(self, deployment), fields(deployment = %key))]
    async fn update_deployment(
        &self,
        key: &ObjectKey,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &key.namespace);

        match deployments
            .replace(&key.name, &PostParams::default(), deployment)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(kube::Error::Api(err)) if err.code == 409 => Err(MounterError::Conflict(format!(
                "deployment {} was modified concurrently: {}",
                key, err.message
            ))),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(secrets.get_opt(name).await?)
    }

    #[instrument(skip(self))]
    async fn list_secrets(&self, namespace: &str, selector: &str) -> Result<Vec<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let list = secrets.list(&ListParams::default().labels(selector)).await?;

        debug!(
            "Found {} secrets in {} matching '{}'",
            list.items.len(),
            namespace,
            selector
        );
        Ok(list.items)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and resource access.

use crate::error::{MounterError, Result};
use crate::kubernetes::ResourceAccessor;
use crate::types::ObjectKey;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, Secret};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("resource", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a mock deployment JSON response with a single container
pub fn deployment_json(namespace: &str, name: &str, resource_version: &str) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": resource_version,
            "labels": { "secret-name": "db-creds" }
        },
        "spec": {
            "selector": { "matchLabels": { "app": name } },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": { "containers": [{ "name": "app", "image": "nginx" }] }
            }
        }
    })
    .to_string()
}

/// Create a mock secret list JSON response
pub fn secret_list_json(namespace: &str, names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "name": name, "namespace": namespace },
                "data": { "user": "YWRtaW4=" },
                "type": "Opaque"
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "SecretList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Build a deployment with the given metadata labels and container names
pub fn make_deployment(
    namespace: &str,
    name: &str,
    labels: &[(&str, &str)],
    containers: &[&str],
) -> Deployment {
    let labels: BTreeMap<String, String> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: (!labels.is_empty()).then_some(labels),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    containers: containers
                        .iter()
                        .map(|c| Container {
                            name: c.to_string(),
                            image: Some("nginx".to_string()),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Build a secret whose `data` holds the given keys
pub fn make_secret(namespace: &str, name: &str, keys: &[&str]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            keys.iter()
                .map(|k| (k.to_string(), ByteString(b"value".to_vec())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// In-memory `ResourceAccessor`. The cache and the live store are separate so
/// tests can make them diverge.
#[derive(Default)]
pub struct FakeAccessor {
    cached: Mutex<HashMap<ObjectKey, Arc<Deployment>>>,
    live: Mutex<HashMap<ObjectKey, Deployment>>,
    secrets: Mutex<Vec<Secret>>,
    conflicts: AtomicU32,
    updates: AtomicU32,
    fail_secret_lookups: Mutex<bool>,
}

impl FakeAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `deployment` both in the cache and on the fake API server
    pub fn with_deployment(self, deployment: Deployment) -> Self {
        let key = key_of(&deployment);
        self.cached
            .lock()
            .unwrap()
            .insert(key.clone(), Arc::new(deployment.clone()));
        self.live.lock().unwrap().insert(key, deployment);
        self
    }

    /// Store `deployment` only on the fake API server
    pub fn with_live_deployment(self, deployment: Deployment) -> Self {
        self.live.lock().unwrap().insert(key_of(&deployment), deployment);
        self
    }

    /// Store `deployment` only in the cache
    pub fn with_cached_deployment(self, deployment: Deployment) -> Self {
        self.cached
            .lock()
            .unwrap()
            .insert(key_of(&deployment), Arc::new(deployment));
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.secrets.lock().unwrap().push(secret);
        self
    }

    /// Reject the next `count` updates with a conflict
    pub fn with_conflicts(self, count: u32) -> Self {
        self.conflicts.store(count, Ordering::SeqCst);
        self
    }

    /// Make every secret lookup fail with a server error
    pub fn with_failing_secret_lookups(self) -> Self {
        *self.fail_secret_lookups.lock().unwrap() = true;
        self
    }

    /// Edit the live deployment and refresh the cache, like a user edit followed
    /// by its watch event
    pub fn edit_deployment<F>(&self, namespace: &str, name: &str, edit: F)
    where
        F: FnOnce(&mut Deployment),
    {
        let key = ObjectKey::new(namespace, name);
        let mut live = self.live.lock().unwrap();
        let deployment = live.get_mut(&key).unwrap();
        edit(deployment);
        self.cached
            .lock()
            .unwrap()
            .insert(key, Arc::new(deployment.clone()));
    }

    pub fn update_count(&self) -> u32 {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn live_deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.live
            .lock()
            .unwrap()
            .get(&ObjectKey::new(namespace, name))
            .cloned()
    }

    fn secret_lookup_error(&self) -> Result<()> {
        if *self.fail_secret_lookups.lock().unwrap() {
            return Err(MounterError::KubeError(kube::Error::Api(
                kube::core::ErrorResponse {
                    status: "Failure".to_string(),
                    message: "etcdserver: request timed out".to_string(),
                    reason: "InternalError".to_string(),
                    code: 500,
                },
            )));
        }
        Ok(())
    }
}

fn key_of(deployment: &Deployment) -> ObjectKey {
    ObjectKey::new(
        deployment.metadata.namespace.clone().unwrap_or_default(),
        deployment.metadata.name.clone().unwrap_or_default(),
    )
}

#[async_trait]
impl ResourceAccessor for FakeAccessor {
    fn get_cached_deployment(&self, key: &ObjectKey) -> Option<Arc<Deployment>> {
        self.cached.lock().unwrap().get(key).cloned()
    }

    async fn get_live_deployment(&self, key: &ObjectKey) -> Result<Option<Deployment>> {
        Ok(self.live.lock().unwrap().get(key).cloned())
    }

    async fn update_deployment(
        &self,
        key: &ObjectKey,
        deployment: &Deployment,
    ) -> Result<Deployment> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let pending_conflicts = self.conflicts.load(Ordering::SeqCst);
        if pending_conflicts > 0 {
            self.conflicts.store(pending_conflicts - 1, Ordering::SeqCst);
            return Err(MounterError::Conflict(format!("{} was modified", key)));
        }

        let mut stored = deployment.clone();
        let version: u64 = stored
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        stored.metadata.resource_version = Some((version + 1).to_string());

        self.live.lock().unwrap().insert(key.clone(), stored.clone());
        self.cached
            .lock()
            .unwrap()
            .insert(key.clone(), Arc::new(stored.clone()));
        Ok(stored)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        self.secret_lookup_error()?;
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .iter()
            .find(|s| {
                s.metadata.namespace.as_deref() == Some(namespace)
                    && s.metadata.name.as_deref() == Some(name)
            })
            .cloned())
    }

    async fn list_secrets(&self, namespace: &str, selector: &str) -> Result<Vec<Secret>> {
        self.secret_lookup_error()?;
        // Only equality selectors of the form `key=value` are understood here
        let (label, value) = selector.split_once('=').unwrap_or((selector, ""));
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.metadata.namespace.as_deref() == Some(namespace))
            .filter(|s| {
                s.metadata
                    .labels
                    .as_ref()
                    .and_then(|l| l.get(label))
                    .is_some_and(|v| v == value)
            })
            .cloned()
            .collect())
    }
}

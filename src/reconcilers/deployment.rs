// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment reconciler - mounts the secrets a deployment declares.
//!
//! Each pass recomputes everything from the cached object and a fresh read of
//! the live object, so it can be re-run from scratch after any failure.

use crate::binding::{apply_patch, build_patch, mount_path_for, resolve_binding, resolve_secrets};
use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::ResourceAccessor;
use crate::types::{ObjectKey, VolumeMountPatch};
use std::fmt;
use tracing::{debug, info, instrument};

/// Shared state handed to every worker
pub struct Context<A> {
    pub accessor: A,
    pub config: Config,
}

impl<A: ResourceAccessor> Context<A> {
    pub fn new(accessor: A, config: Config) -> Self {
        Self { accessor, config }
    }
}

/// Why a reconcile pass made no change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The deployment was deleted before it was processed
    NotFound,
    /// No binding label or annotation
    NoBinding,
    /// The binding matched no secrets
    NoSecrets,
    /// None of the requested keys exist in any matched secret
    NoProjectedKeys,
    /// The deployment has no pod spec to patch
    NoPodSpec,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NotFound => "deployment not found",
            SkipReason::NoBinding => "no secret binding declared",
            SkipReason::NoSecrets => "no matching secrets",
            SkipReason::NoProjectedKeys => "none of the requested keys exist",
            SkipReason::NoPodSpec => "pod template has no spec",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The deployment was updated with this many secret volumes
    Applied { secrets: usize },
    /// Every declared secret was already mounted
    Unchanged,
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied { .. })
    }
}

/// Reconcile one deployment: resolve its binding, build the secret volume
/// patches and write them to the live object.
#[instrument(skip(ctx, key), fields(deployment = %key))]
pub async fn reconcile<A>(ctx: &Context<A>, key: &ObjectKey) -> Result<ReconcileOutcome>
where
    A: ResourceAccessor,
{
    let Some(cached) = ctx.accessor.get_cached_deployment(key) else {
        return Ok(ReconcileOutcome::Skipped(SkipReason::NotFound));
    };

    let Some(binding) = resolve_binding(&cached.metadata) else {
        debug!("Deployment {} has no secret binding, skipping", key);
        return Ok(ReconcileOutcome::Skipped(SkipReason::NoBinding));
    };
    debug!(
        origin = ?binding.origin,
        source = ?binding.source,
        keys = ?binding.keys,
        "Resolved secret binding"
    );

    let secrets = resolve_secrets(
        &ctx.accessor,
        &key.namespace,
        &binding.source,
        &ctx.config.bulk_selector,
    )
    .await?;
    if secrets.is_empty() {
        return Ok(ReconcileOutcome::Skipped(SkipReason::NoSecrets));
    }

    let base_path = binding.mount_path_or(&ctx.config.default_mount_path);
    let shared = secrets.len() > 1;
    let patches: Vec<VolumeMountPatch> = secrets
        .iter()
        .filter_map(|secret| {
            let path = mount_path_for(base_path, &secret.name, shared);
            build_patch(secret, &binding.keys, &path)
        })
        .collect();
    if patches.is_empty() {
        return Ok(ReconcileOutcome::Skipped(SkipReason::NoProjectedKeys));
    }

    // Never patch the cached copy, it may be stale
    let Some(mut live) = ctx.accessor.get_live_deployment(key).await? else {
        return Ok(ReconcileOutcome::Skipped(SkipReason::NotFound));
    };
    let Some(pod) = live
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
    else {
        return Ok(ReconcileOutcome::Skipped(SkipReason::NoPodSpec));
    };

    let mut changed = false;
    for patch in &patches {
        changed |= apply_patch(pod, patch);
    }
    if !changed {
        return Ok(ReconcileOutcome::Unchanged);
    }

    ctx.accessor.update_deployment(key, &live).await?;
    info!(
        "Mounted {} secret volume(s) into deployment {}",
        patches.len(),
        key
    );

    Ok(ReconcileOutcome::Applied {
        secrets: patches.len(),
    })
}

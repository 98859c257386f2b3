// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds secret volumes and merges them into a pod template.
//!
//! Volumes and mounts are matched by their deterministic name, so merging the
//! same patch twice leaves the pod spec unchanged.

use crate::constants::{DEFAULT_FILE_MODE, VOLUME_SUFFIX};
use crate::types::{SecretMaterial, VolumeMountPatch};
use k8s_openapi::api::core::v1::{KeyToPath, PodSpec, SecretVolumeSource, Volume, VolumeMount};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Build the volume and mount for `secret`.
///
/// With `requested_keys`, only keys present in the secret are projected and
/// missing ones are logged. Returns `None` when keys were requested but none
/// exist, since an empty projection would expose the whole secret.
pub fn build_patch(
    secret: &SecretMaterial,
    requested_keys: &[String],
    mount_path: &str,
) -> Option<VolumeMountPatch> {
    let items = if requested_keys.is_empty() {
        None
    } else {
        let (present, missing): (Vec<&String>, Vec<&String>) = requested_keys
            .iter()
            .partition(|key| secret.keys.contains(key.as_str()));

        for key in &missing {
            warn!("Secret {} has no key '{}', skipping it", secret.name, key);
        }
        if present.is_empty() {
            return None;
        }

        Some(
            present
                .into_iter()
                .map(|key| KeyToPath {
                    key: key.clone(),
                    path: key.clone(),
                    mode: None,
                })
                .collect(),
        )
    };

    let volume_name = secret.volume_name();

    Some(VolumeMountPatch {
        volume: Volume {
            name: volume_name.clone(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret.name.clone()),
                items,
                default_mode: Some(DEFAULT_FILE_MODE),
                optional: None,
            }),
            ..Default::default()
        },
        mount: VolumeMount {
            name: volume_name,
            mount_path: mount_path.to_string(),
            read_only: Some(true),
            ..Default::default()
        },
    })
}

/// Mount path for one of the secrets of a binding. When a binding resolves to
/// several secrets each gets its own subdirectory.
pub fn mount_path_for(base: &str, secret_name: &str, shared: bool) -> String {
    if shared {
        format!("{}/{}", base.trim_end_matches('/'), secret_name)
    } else {
        base.to_string()
    }
}

/// Merge `patch` into `pod`, replacing a volume or mount of the same name.
/// Secret mounts of ours left on the same path by an earlier binding are
/// removed first. Returns whether anything changed.
pub fn apply_patch(pod: &mut PodSpec, patch: &VolumeMountPatch) -> bool {
    let mut changed = evict_displaced(pod, &patch.mount);

    let volumes = pod.volumes.get_or_insert_with(Vec::new);
    changed |= upsert(volumes, &patch.volume, |v| v.name == patch.volume.name);

    for container in pod.containers.iter_mut() {
        let mounts = container.volume_mounts.get_or_insert_with(Vec::new);
        if upsert(mounts, &patch.mount, |m| m.name == patch.mount.name) {
            debug!(
                "Mounted volume {} in container {}",
                patch.mount.name, container.name
            );
            changed = true;
        }
    }

    changed
}

/// Drop secret mounts owned by this controller that sit on `mount.mount_path`
/// under another name, along with their volumes once nothing mounts them.
fn evict_displaced(pod: &mut PodSpec, mount: &VolumeMount) -> bool {
    let displaced = |m: &VolumeMount| {
        m.name != mount.name && m.name.ends_with(VOLUME_SUFFIX) && m.mount_path == mount.mount_path
    };

    let mut evicted = BTreeSet::new();
    for container in pod.containers.iter_mut() {
        if let Some(mounts) = container.volume_mounts.as_mut() {
            mounts.retain(|m| {
                if displaced(m) {
                    evicted.insert(m.name.clone());
                    false
                } else {
                    true
                }
            });
        }
    }
    if evicted.is_empty() {
        return false;
    }

    let still_mounted = |name: &str| {
        pod.containers
            .iter()
            .flat_map(|c| c.volume_mounts.iter().flatten())
            .any(|m| m.name == name)
    };
    let orphaned: BTreeSet<String> = evicted
        .into_iter()
        .filter(|name| !still_mounted(name.as_str()))
        .collect();
    if let Some(volumes) = pod.volumes.as_mut() {
        volumes.retain(|v| !orphaned.contains(&v.name));
    }

    info!(
        "Replaced secret volume(s) {:?} mounted at {}",
        orphaned, mount.mount_path
    );
    true
}

fn upsert<T, F>(items: &mut Vec<T>, item: &T, same: F) -> bool
where
    T: Clone + PartialEq,
    F: Fn(&T) -> bool,
{
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) if existing == item => false,
        Some(existing) => {
            *existing = item.clone();
            true
        }
        None => {
            items.push(item.clone());
            true
        }
    }
}

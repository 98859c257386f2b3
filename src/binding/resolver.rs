// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Extracts the secret binding declaration from deployment metadata.
//!
//! This is the only place that reads binding label/annotation keys.

use crate::constants::binding;
use crate::types::{BindingDeclaration, BindingOrigin, SecretSource};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use tracing::warn;

/// Resolve the binding declared on an object.
///
/// Labels are consulted first; annotations are only read when the labels carry
/// no secret reference. The two sources are never merged.
pub fn resolve_binding(metadata: &ObjectMeta) -> Option<BindingDeclaration> {
    metadata
        .labels
        .as_ref()
        .and_then(|labels| from_map(labels, BindingOrigin::Labels))
        .or_else(|| {
            metadata
                .annotations
                .as_ref()
                .and_then(|annotations| from_map(annotations, BindingOrigin::Annotations))
        })
}

fn from_map(map: &BTreeMap<String, String>, origin: BindingOrigin) -> Option<BindingDeclaration> {
    let source = match non_empty(map, binding::SECRET_NAME) {
        Some(name) => SecretSource::Named(name.to_string()),
        None if map.get(binding::BULK).is_some_and(|v| v.trim() == "true") => SecretSource::Bulk,
        None => return None,
    };

    let keys = non_empty(map, binding::SECRET_KEYS)
        .map(parse_keys)
        .unwrap_or_default();

    let mount_path = non_empty(map, binding::MOUNT_PATH).and_then(|path| {
        if path.starts_with('/') {
            Some(path.to_string())
        } else {
            warn!(
                "Ignoring {} '{}': mount path must be absolute",
                binding::MOUNT_PATH,
                path
            );
            None
        }
    });

    Some(BindingDeclaration {
        source,
        keys,
        mount_path,
        origin,
    })
}

fn non_empty<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Split a dot-separated key list, dropping empty segments and repeats
fn parse_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw.split('.').map(str::trim).filter(|k| !k.is_empty()) {
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

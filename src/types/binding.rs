// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::VOLUME_SUFFIX;
use k8s_openapi::api::core::v1::{Secret, Volume, VolumeMount};
use kube::ResourceExt;
use std::collections::BTreeSet;

/// Where a deployment's binding declaration was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    Labels,
    Annotations,
}

/// How the secrets for a binding are selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// A single secret referenced by name
    Named(String),
    /// Every secret in the namespace matching the configured bulk selector
    Bulk,
}

/// Typed view of the secret binding declared in a deployment's metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDeclaration {
    pub source: SecretSource,
    /// Entry keys to project, in declaration order. Empty projects the whole secret.
    pub keys: Vec<String>,
    pub mount_path: Option<String>,
    pub origin: BindingOrigin,
}

impl BindingDeclaration {
    /// Mount path for this binding, falling back to `default`
    pub fn mount_path_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.mount_path.as_deref().unwrap_or(default)
    }
}

/// A resolved secret: its name and the keys it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMaterial {
    pub name: String,
    /// Union of `data` and `stringData` keys
    pub keys: BTreeSet<String>,
}

impl SecretMaterial {
    pub fn from_secret(secret: &Secret) -> Self {
        let data_keys = secret.data.iter().flat_map(|d| d.keys());
        let string_keys = secret.string_data.iter().flat_map(|d| d.keys());

        SecretMaterial {
            name: secret.name_any(),
            keys: data_keys.chain(string_keys).cloned().collect(),
        }
    }

    /// Deterministic volume name, so that re-applying a binding is idempotent
    pub fn volume_name(&self) -> String {
        format!("{}{}", self.name, VOLUME_SUFFIX)
    }
}

/// Volume plus the read-only mount added to every container
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeMountPatch {
    pub volume: Volume,
    pub mount: VolumeMount,
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::MounterError;
use kube::{Resource, ResourceExt};
use std::fmt;
use std::str::FromStr;

/// Identity of a namespaced object, rendered as `namespace/name` on the work queue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Queue key for an observed object. Cluster-scoped objects yield a bare
    /// name, which fails to parse back into an `ObjectKey`.
    pub fn queue_key<K: Resource>(obj: &K) -> String {
        match obj.namespace() {
            Some(ns) if !ns.is_empty() => format!("{}/{}", ns, obj.name_any()),
            _ => obj.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = MounterError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(ObjectKey::new(ns, name))
            }
            _ => Err(MounterError::MalformedKey(format!(
                "expected 'namespace/name', got '{}'",
                key
            ))),
        }
    }
}

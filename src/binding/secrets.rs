// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns a binding's secret source into concrete secrets

use crate::error::Result;
use crate::kubernetes::ResourceAccessor;
use crate::types::{SecretMaterial, SecretSource};
use tracing::{debug, instrument};

/// Resolve the secrets a binding refers to in `namespace`.
///
/// A missing named secret resolves to an empty list; lookup failures are
/// returned to the caller.
#[instrument(skip(accessor))]
pub async fn resolve_secrets<A>(
    accessor: &A,
    namespace: &str,
    source: &SecretSource,
    bulk_selector: &str,
) -> Result<Vec<SecretMaterial>>
where
    A: ResourceAccessor + ?Sized,
{
    let secrets = match source {
        SecretSource::Named(name) => match accessor.get_secret(namespace, name).await? {
            Some(secret) => vec![secret],
            None => {
                debug!("Secret {}/{} does not exist", namespace, name);
                Vec::new()
            }
        },
        SecretSource::Bulk => accessor.list_secrets(namespace, bulk_selector).await?,
    };

    let mut materials: Vec<SecretMaterial> =
        secrets.iter().map(SecretMaterial::from_secret).collect();
    materials.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(materials)
}

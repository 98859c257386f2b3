// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MounterError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Malformed work item key: {0}")]
    MalformedKey(String),
}

impl MounterError {
    /// Whether retrying the same work item later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MounterError::Conflict(_) => true,
            MounterError::KubeError(kube::Error::Api(err)) => {
                err.code == 409 || err.code == 429 || err.code >= 500
            }
            MounterError::KubeError(_) => true,
            MounterError::MalformedKey(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MounterError>;

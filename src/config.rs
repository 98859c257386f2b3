// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_BULK_SELECTOR, DEFAULT_MOUNT_PATH};
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent worker loops draining the work queue
    pub workers: usize,
    /// Mount path used when a binding has no override
    pub default_mount_path: String,
    /// Label selector used to find secrets for bulk bindings
    pub bulk_selector: String,
    /// Only watch deployments in this namespace (all namespaces when unset)
    pub watch_namespace: Option<String>,
    /// Interval at which every cached deployment is re-enqueued, `None` disables resync
    pub resync_interval: Option<Duration>,
    /// Transient failures tolerated before a work item is dropped
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: 1,
            default_mount_path: DEFAULT_MOUNT_PATH.to_string(),
            bulk_selector: DEFAULT_BULK_SELECTOR.to_string(),
            watch_namespace: None,
            resync_interval: Some(Duration::from_secs(30)),
            max_retries: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration using `lookup` to resolve variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let workers: usize = parse_or(&lookup, "WORKERS", defaults.workers)?;
        let default_mount_path = lookup("DEFAULT_MOUNT_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.default_mount_path);
        if !default_mount_path.starts_with('/') {
            bail!(
                "DEFAULT_MOUNT_PATH must be an absolute path, got '{}'",
                default_mount_path
            );
        }
        let bulk_selector = lookup("BULK_SECRET_SELECTOR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.bulk_selector);
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let resync_secs: u64 = parse_or(
            &lookup,
            "RESYNC_INTERVAL_SECS",
            defaults.resync_interval.map_or(0, |d| d.as_secs()),
        )?;
        let max_retries: u32 = parse_or(&lookup, "MAX_RETRIES", defaults.max_retries)?;

        Ok(Config {
            workers: workers.max(1),
            default_mount_path,
            bulk_selector,
            watch_namespace,
            resync_interval: (resync_secs > 0).then(|| Duration::from_secs(resync_secs)),
            max_retries,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        None => Ok(default),
    }
}

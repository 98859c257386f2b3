// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-item exponential backoff for re-queued work items

use crate::constants::queue::{BASE_DELAY_MS, MAX_DELAY_SECS};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Tracks failures per item and computes the delay before its next attempt.
/// The delay doubles with each failure, starting at `base` and capped at `max`.
#[derive(Debug)]
pub struct RateLimiter<K> {
    base: Duration,
    max: Duration,
    failures: HashMap<K, u32>,
}

impl<K: Eq + Hash + Clone> RateLimiter<K> {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: HashMap::new(),
        }
    }

    /// Record a failure for `item` and return how long to wait before retrying it
    pub fn when(&mut self, item: &K) -> Duration {
        let failures = self.failures.entry(item.clone()).or_insert(0);
        let exponent = *failures;
        *failures = failures.saturating_add(1);

        // 2^31 * base already exceeds any sensible cap
        let factor = 1u32.checked_shl(exponent.min(31)).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Number of failures recorded since the last `forget`
    pub fn num_requeues(&self, item: &K) -> u32 {
        self.failures.get(item).copied().unwrap_or(0)
    }

    /// Clear the failure history for `item`
    pub fn forget(&mut self, item: &K) {
        self.failures.remove(item);
    }
}

impl<K: Eq + Hash + Clone> Default for RateLimiter<K> {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(BASE_DELAY_MS),
            Duration::from_secs(MAX_DELAY_SECS),
        )
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deduplicating, rate-limited work queue.
//!
//! An item is held at most once while pending. Adding an item that is being
//! processed marks it dirty; it is queued again when the worker calls `done`,
//! so the same item is never processed by two workers at once.

use super::rate_limiter::RateLimiter;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::trace;

struct State<K> {
    queue: VecDeque<K>,
    /// Items waiting to be processed, queued or not
    dirty: HashSet<K>,
    /// Items handed out by `get` and not yet `done`
    processing: HashSet<K>,
    limiter: RateLimiter<K>,
    shutting_down: bool,
}

struct Inner<K> {
    state: Mutex<State<K>>,
    notify: Notify,
}

/// Cloneable handle to a shared work queue
pub struct WorkQueue<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Clone for WorkQueue<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K> WorkQueue<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new(limiter: RateLimiter<K>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    dirty: HashSet::new(),
                    processing: HashSet::new(),
                    limiter,
                    shutting_down: false,
                }),
                notify: Notify::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State<K>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue `item` unless it is already pending. Ignored after shutdown.
    pub fn add(&self, item: K) {
        let mut state = self.state();
        if state.shutting_down || state.dirty.contains(&item) {
            return;
        }
        state.dirty.insert(item.clone());
        if state.processing.contains(&item) {
            trace!("Item is in flight, deferring until done");
            return;
        }
        state.queue.push_back(item);
        drop(state);
        self.inner.notify.notify_one();
    }

    /// Enqueue `item` after `delay` has elapsed
    pub fn add_after(&self, item: K, delay: Duration) {
        if self.is_shutting_down() {
            return;
        }
        if delay.is_zero() {
            self.add(item);
            return;
        }
        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(item);
        });
    }

    /// Enqueue `item` after the backoff delay for its failure count
    pub fn add_rate_limited(&self, item: K) {
        let delay = self.state().limiter.when(&item);
        self.add_after(item, delay);
    }

    /// Number of times `item` has been re-queued through `add_rate_limited`
    pub fn num_requeues(&self, item: &K) -> u32 {
        self.state().limiter.num_requeues(item)
    }

    /// Clear the backoff history of `item`
    pub fn forget(&self, item: &K) {
        self.state().limiter.forget(item);
    }

    /// Wait for the next item. Returns `None` once the queue is shut down.
    pub async fn get(&self) -> Option<K> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state();
                if state.shutting_down {
                    return None;
                }
                if let Some(item) = state.queue.pop_front() {
                    state.dirty.remove(&item);
                    state.processing.insert(item.clone());
                    let more = !state.queue.is_empty();
                    drop(state);
                    if more {
                        // Our permit may have been consumed by this item; pass it on
                        self.inner.notify.notify_one();
                    }
                    return Some(item);
                }
            }

            notified.await;
        }
    }

    /// Mark `item` as processed. If it was added again meanwhile it is re-queued.
    pub fn done(&self, item: &K) {
        let mut state = self.state();
        state.processing.remove(item);
        if state.dirty.contains(item) && !state.shutting_down {
            state.queue.push_back(item.clone());
            drop(state);
            self.inner.notify.notify_one();
        }
    }

    /// Number of items waiting to be handed out
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop handing out items and wake every waiting `get`
    pub fn shut_down(&self) {
        self.state().shutting_down = true;
        self.inner.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state().shutting_down
    }
}

impl<K> Default for WorkQueue<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(RateLimiter::default())
    }
}

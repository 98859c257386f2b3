// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Worker loops that drain the work queue and classify reconcile outcomes.

use super::deployment::{reconcile, Context, ReconcileOutcome, SkipReason};
use crate::config::Config;
use crate::error::MounterError;
use crate::kubernetes::ResourceAccessor;
use crate::queue::WorkQueue;
use crate::types::ObjectKey;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What to do with a work item whose reconcile failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-queue with the queue's backoff
    Requeue,
    /// Forget the item; a later event or resync triggers it again
    Drop,
}

pub struct ReconcileDriver<A> {
    ctx: Arc<Context<A>>,
    queue: WorkQueue<String>,
}

impl<A> Clone for ReconcileDriver<A> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<A: ResourceAccessor + 'static> ReconcileDriver<A> {
    pub fn new(accessor: A, queue: WorkQueue<String>, config: Config) -> Self {
        Self {
            ctx: Arc::new(Context::new(accessor, config)),
            queue,
        }
    }

    /// Run the configured number of workers until the queue shuts down
    pub async fn run(self) -> anyhow::Result<()> {
        let workers = self.ctx.config.workers.max(1);
        info!("Starting {} reconcile worker(s)", workers);

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let driver = self.clone();
                tokio::spawn(async move { driver.run_worker(id).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result?;
        }

        info!("All reconcile workers stopped");
        Ok(())
    }

    async fn run_worker(self, id: usize) {
        debug!("Worker {} started", id);
        while self.process_one().await {}
        debug!("Worker {} stopped", id);
    }

    /// Process a single work item. Returns `false` once the queue is shut down.
    pub async fn process_one(&self) -> bool {
        let Some(item) = self.queue.get().await else {
            return false;
        };

        match item.parse::<ObjectKey>() {
            Ok(key) => {
                let result = reconcile(&self.ctx, &key).await;
                self.handle_result(&item, result);
            }
            Err(e) => {
                // Can never succeed, so it must not be retried
                error!("Dropping work item: {}", e);
                self.queue.forget(&item);
            }
        }

        self.queue.done(&item);
        true
    }

    fn handle_result(&self, item: &String, result: crate::error::Result<ReconcileOutcome>) {
        match result {
            Ok(ReconcileOutcome::Applied { secrets }) => {
                info!("Reconciled {}: mounted {} secret(s)", item, secrets);
                self.queue.forget(item);
            }
            Ok(ReconcileOutcome::Unchanged) => {
                debug!("Reconciled {}: already up to date", item);
                self.queue.forget(item);
            }
            Ok(ReconcileOutcome::Skipped(SkipReason::NoBinding)) => {
                self.queue.forget(item);
            }
            Ok(ReconcileOutcome::Skipped(reason)) => {
                info!("Skipped {}: {}", item, reason);
                self.queue.forget(item);
            }
            Err(e) => {
                let requeues = self.queue.num_requeues(item);
                match error_policy(&e, requeues, self.ctx.config.max_retries) {
                    RetryDecision::Requeue => {
                        warn!(
                            "Reconcile of {} failed (attempt {}), retrying: {}",
                            item,
                            requeues + 1,
                            e
                        );
                        self.queue.add_rate_limited(item.clone());
                    }
                    RetryDecision::Drop => {
                        error!("Reconcile of {} failed, giving up: {}", item, e);
                        self.queue.forget(item);
                    }
                }
            }
        }
    }
}

/// Transient errors are retried until `max_retries` re-queues; anything else is dropped
pub fn error_policy(error: &MounterError, requeues: u32, max_retries: u32) -> RetryDecision {
    if error.is_transient() && requeues < max_retries {
        RetryDecision::Requeue
    } else {
        RetryDecision::Drop
    }
}

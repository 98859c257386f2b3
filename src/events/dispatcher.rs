// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Moves keys from the event channel into the work queue.

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::queue::WorkQueue;
use tokio::sync::mpsc;
use tracing::{error, info, trace};

/// Handle the event source uses to announce changed objects
#[derive(Clone)]
pub struct EventHandle {
    event_tx: mpsc::Sender<String>,
}

impl EventHandle {
    /// Send the queue key of a changed object. Waits while the channel is full.
    pub async fn send(&self, key: String) {
        if let Err(e) = self.event_tx.send(key).await {
            error!("Failed to send event to dispatcher: {}", e);
        }
    }
}

/// Receives keys from the event source and adds them to the work queue,
/// where duplicates are coalesced.
pub struct Dispatcher {
    event_rx: mpsc::Receiver<String>,
    queue: WorkQueue<String>,
}

impl Dispatcher {
    pub fn new(queue: WorkQueue<String>) -> (Self, EventHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let dispatcher = Self { event_rx, queue };
        let handle = EventHandle { event_tx };
        (dispatcher, handle)
    }

    /// Forward events until every handle is dropped or the queue shuts down
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Dispatcher started, listening for events...");

        while let Some(key) = self.event_rx.recv().await {
            if self.queue.is_shutting_down() {
                break;
            }
            trace!("Enqueueing {}", key);
            self.queue.add(key);
        }

        info!("Dispatcher stopped");
        Ok(())
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event source: deployment watch, periodic resync and the channel into the work queue.

pub mod dispatcher;
pub mod source;

pub use dispatcher::{Dispatcher, EventHandle};
pub use source::{resync, DeploymentWatcher};

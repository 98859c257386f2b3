// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment reconciliation and the workers that drive it.

pub mod deployment;
pub mod driver;

pub use deployment::{reconcile, Context, ReconcileOutcome, SkipReason};
pub use driver::{error_policy, ReconcileDriver, RetryDecision};

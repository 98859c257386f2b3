// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Work queue feeding the reconcile workers.

pub mod rate_limiter;
pub mod work_queue;

pub use rate_limiter::RateLimiter;
pub use work_queue::WorkQueue;

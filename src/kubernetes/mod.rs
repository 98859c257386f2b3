// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for resource access and API connectivity.

pub mod accessor;
pub mod client;

pub use accessor::{KubeAccessor, ResourceAccessor};
pub use client::connect;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding resolution: from deployment metadata to secret volume patches.

pub mod patch;
pub mod resolver;
pub mod secrets;

pub use patch::{apply_patch, build_patch, mount_path_for};
pub use resolver::resolve_binding;
pub use secrets::resolve_secrets;

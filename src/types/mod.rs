// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the queue, resolvers and reconcilers.

pub mod binding;
pub mod key;

pub use binding::{BindingDeclaration, BindingOrigin, SecretMaterial, SecretSource, VolumeMountPatch};
pub use key::ObjectKey;

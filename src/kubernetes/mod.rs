// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: store capabilities, the live store, and namespace selection.

pub mod client;
pub mod namespaces;
pub mod store;

pub use client::KubeStore;
pub use namespaces::{eligible_namespaces, is_eligible};
pub use store::{SecretStore, WorkloadStore};

#[cfg(test)]
pub use store::{MockSecretStore, MockWorkloadStore};

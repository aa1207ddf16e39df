// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events and drive the sync logic.

pub mod configmap;
pub mod pod;
pub mod secret;

pub use configmap::ConfigMapReconciler;
pub use pod::PodReconciler;
pub use secret::SecretReconciler;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation logic for both loops, independent of the watch machinery.

pub mod annotations;
pub mod replication;
pub mod router;
pub mod secrets;

pub use annotations::{desired_annotations, PodAnnotationReconciler, PodOutcome};
pub use replication::{NamespaceFailure, ReplicationReport, SecretReplicationReconciler};
pub use router::EventRouter;
pub use secrets::{data_equal, upsert_replica, UpsertOutcome};

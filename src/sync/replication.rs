// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fan-out of the canonical secret to every eligible namespace.
//!
//! Every pass is a full resync regardless of which secret triggered it.
//! Replicas are never deleted, not even when the canonical secret is gone.

use crate::config::Keys;
use crate::error::{Result, StoreError};
use crate::kubernetes::{eligible_namespaces, SecretStore};
use crate::sync::secrets::{upsert_replica, UpsertOutcome};
use crate::types::ObjectKey;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A namespace whose replica could not be written during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceFailure {
    pub namespace: String,
    pub error: StoreError,
}

/// Per-namespace results of one replication pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationReport {
    /// False when the canonical secret did not exist and nothing was attempted
    pub canonical_present: bool,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    /// Swallowed failures; they do not fail the pass
    pub failures: Vec<NamespaceFailure>,
}

impl ReplicationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SecretReplicationReconciler {
    store: Arc<dyn SecretStore>,
    keys: Keys,
}

impl SecretReplicationReconciler {
    pub fn new(store: Arc<dyn SecretStore>, keys: Keys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Identity of the canonical secret
    pub fn canonical_key(&self) -> ObjectKey {
        ObjectKey::new(&self.keys.canonical_namespace, &self.keys.canonical_name)
    }

    /// Converge every eligible namespace on the canonical secret.
    ///
    /// `trigger` is only logged. Failing to load the canonical secret (other
    /// than it being absent) or to list namespaces fails the pass; a failure
    /// in one namespace is recorded in the report and the loop continues.
    #[instrument(skip(self, trigger), fields(trigger = %trigger))]
    pub async fn reconcile(&self, trigger: &ObjectKey) -> Result<ReplicationReport> {
        let canonical_key = self.canonical_key();
        let canonical = match self
            .store
            .get_secret(&canonical_key.namespace, &canonical_key.name)
            .await
        {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => {
                // TODO: delete replicas along with the canonical secret once
                // replicas carry an ownership marker
                warn!("Canonical secret {} not found, skipping sync", canonical_key);
                return Ok(ReplicationReport::default());
            }
            Err(e) => {
                error!("Failed to load canonical secret {}: {}", canonical_key, e);
                return Err(e.into());
            }
        };

        let namespaces = self.store.list_namespaces().await.map_err(|e| {
            error!("Error listing namespaces: {}", e);
            e
        })?;
        let targets = eligible_namespaces(
            namespaces,
            &self.keys.sync_label,
            &self.keys.sync_label_value,
        );
        debug!("Found {} namespaces to sync", targets.len());

        let mut report = ReplicationReport {
            canonical_present: true,
            ..Default::default()
        };

        for ns in targets {
            let namespace = ns.name_any();
            match upsert_replica(self.store.as_ref(), &namespace, &canonical).await {
                Ok(UpsertOutcome::Created) => report.created.push(namespace),
                Ok(UpsertOutcome::Updated) => report.updated.push(namespace),
                Ok(UpsertOutcome::Unchanged) => report.unchanged.push(namespace),
                Err(e) => {
                    // Continue with other namespaces even if one fails
                    warn!("Failed to sync secret to namespace {}: {}", namespace, e);
                    report.failures.push(NamespaceFailure {
                        namespace,
                        error: e,
                    });
                }
            }
        }

        info!(
            "Secret sync finished: {} created, {} updated, {} unchanged, {} failed",
            report.created.len(),
            report.updated.len(),
            report.unchanged.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

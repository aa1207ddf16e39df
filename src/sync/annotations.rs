// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Projection of ConfigMap data onto Pod annotations.
//!
//! A Pod annotated with the reference key names a ConfigMap in its own
//! namespace. Every data entry `k = v` becomes the annotation
//! `<prefix>k = v`. An empty or absent data map clears all prefixed
//! annotations and sets the sentinel instead. Keys removed from a non-empty
//! ConfigMap are left on the Pod.

use crate::config::Keys;
use crate::error::{Result, StoreError};
use crate::kubernetes::WorkloadStore;
use crate::types::ObjectKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What a single reconciliation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodOutcome {
    /// The Pod no longer exists
    WorkloadMissing,
    /// The Pod does not reference a ConfigMap
    Unreferenced,
    /// The referenced ConfigMap could not be loaded; retried on the next event
    ConfigUnavailable,
    /// Annotations already matched the ConfigMap
    Unchanged,
    Updated,
}

/// Compute the annotations a Pod should carry given its current annotations
/// and the referenced ConfigMap's data.
pub fn desired_annotations(
    current: &BTreeMap<String, String>,
    data: Option<&BTreeMap<String, String>>,
    keys: &Keys,
) -> BTreeMap<String, String> {
    let mut annotations = current.clone();

    match data.filter(|d| !d.is_empty()) {
        None => {
            annotations.retain(|k, _| !k.starts_with(&keys.derived_prefix));
            annotations.insert(keys.sentinel_key.clone(), keys.sentinel_value.clone());
        }
        Some(data) => {
            for (k, v) in data {
                annotations.insert(format!("{}{}", keys.derived_prefix, k), v.clone());
            }
        }
    }

    annotations
}

pub struct PodAnnotationReconciler {
    store: Arc<dyn WorkloadStore>,
    keys: Keys,
}

impl PodAnnotationReconciler {
    pub fn new(store: Arc<dyn WorkloadStore>, keys: Keys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Bring one Pod's derived annotations in line with its ConfigMap.
    ///
    /// Only a failed Pod write is returned as an error; a missing Pod or an
    /// unreadable ConfigMap ends the pass successfully without a write.
    #[instrument(skip(self, key), fields(pod = %key))]
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<PodOutcome> {
        let mut pod = match self.store.get_pod(&key.namespace, &key.name).await {
            Ok(pod) => pod,
            Err(e) if e.is_not_found() => {
                debug!("Pod {} is gone, nothing to do", key);
                return Ok(PodOutcome::WorkloadMissing);
            }
            Err(e) => return Err(e.into()),
        };

        let current = pod.metadata.annotations.clone().unwrap_or_default();
        let Some(config_map_name) = current.get(&self.keys.reference_annotation) else {
            debug!(
                "Pod {} has no {} annotation, skipping",
                key, self.keys.reference_annotation
            );
            return Ok(PodOutcome::Unreferenced);
        };

        let config_map = match self
            .store
            .get_config_map(&key.namespace, config_map_name)
            .await
        {
            Ok(cm) => cm,
            Err(e) => {
                warn!(
                    "Could not load ConfigMap {}/{} for pod {}: {}",
                    key.namespace, config_map_name, key, e
                );
                return Ok(PodOutcome::ConfigUnavailable);
            }
        };

        let desired = desired_annotations(&current, config_map.data.as_ref(), &self.keys);
        if desired == current {
            debug!("Pod {} annotations already up to date", key);
            return Ok(PodOutcome::Unchanged);
        }

        pod.metadata.annotations = Some(desired);
        self.store.update_pod(&pod).await.map_err(|e: StoreError| {
            warn!("Failed to update pod {} with ConfigMap data: {}", key, e);
            e
        })?;

        info!(
            "Updated pod {} annotations from ConfigMap {}",
            key, config_map_name
        );
        Ok(PodOutcome::Updated)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Maps a changed ConfigMap to the Pods that reference it.

use crate::config::Keys;
use crate::kubernetes::WorkloadStore;
use crate::types::ObjectKey;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub struct EventRouter {
    store: Arc<dyn WorkloadStore>,
    keys: Keys,
}

impl EventRouter {
    pub fn new(store: Arc<dyn WorkloadStore>, keys: Keys) -> Self {
        Self { store, keys }
    }

    /// One work item per Pod in the ConfigMap's namespace whose reference
    /// annotation names this ConfigMap. Order is not meaningful.
    ///
    /// A failed Pod listing yields no items; it is logged and not retried.
    #[instrument(skip(self, config_map), fields(config_map = %config_map.name_any()))]
    pub async fn route(&self, config_map: &ConfigMap) -> Vec<ObjectKey> {
        let Some(namespace) = config_map.namespace() else {
            debug!("ConfigMap {} has no namespace, nothing to route", config_map.name_any());
            return Vec::new();
        };
        let name = config_map.name_any();

        let pods = match self.store.list_pods(&namespace).await {
            Ok(pods) => pods,
            Err(e) => {
                error!("Failed to list pods in namespace {}: {}", namespace, e);
                return Vec::new();
            }
        };

        let items: Vec<ObjectKey> = pods
            .iter()
            .filter(|pod| {
                pod.annotations()
                    .get(&self.keys.reference_annotation)
                    .is_some_and(|v| *v == name)
            })
            .map(|pod| ObjectKey::new(namespace.clone(), pod.name_any()))
            .collect();

        debug!(
            "ConfigMap {}/{} is referenced by {} pods",
            namespace,
            name,
            items.len()
        );
        items
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMap reconciler - re-projects every Pod that references a changed ConfigMap.

use crate::constants::timing::ERROR_REQUEUE_SECS;
use crate::error::{Result, SyncError};
use crate::sync::{EventRouter, PodAnnotationReconciler};
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct ConfigMapReconciler {
    client: Client,
    router: EventRouter,
    sync: Arc<PodAnnotationReconciler>,
}

impl ConfigMapReconciler {
    pub fn new(client: Client, router: EventRouter, sync: Arc<PodAnnotationReconciler>) -> Self {
        Self {
            client,
            router,
            sync,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config_maps: Api<ConfigMap> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(config_maps, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled configmap: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Reconcile every Pod routed from `config_map`.
    /// All Pods are attempted; the first failure is returned afterwards.
    pub async fn fan_out(&self, config_map: &ConfigMap) -> Result<usize> {
        let items = self.router.route(config_map).await;
        let mut first_error = None;

        for key in &items {
            if let Err(e) = self.sync.reconcile(key).await {
                warn!(
                    "Failed to reconcile pod {} for ConfigMap {}: {}",
                    key,
                    config_map.name_any(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(items.len()),
        }
    }
}

async fn reconcile(config_map: Arc<ConfigMap>, ctx: Arc<ConfigMapReconciler>) -> Result<Action> {
    let count = ctx.fan_out(&config_map).await?;
    debug!(
        "ConfigMap {}/{} triggered {} pod reconciliations",
        config_map.namespace().unwrap_or_default(),
        config_map.name_any(),
        count
    );
    Ok(Action::await_change())
}

fn error_policy(
    _config_map: Arc<ConfigMap>,
    error: &SyncError,
    _ctx: Arc<ConfigMapReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}

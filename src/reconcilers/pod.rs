// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod reconciler - projects the referenced ConfigMap onto each changed Pod.

use crate::constants::timing::ERROR_REQUEUE_SECS;
use crate::error::{Result, SyncError};
use crate::sync::PodAnnotationReconciler;
use crate::types::ObjectKey;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct PodReconciler {
    client: Client,
    sync: Arc<PodAnnotationReconciler>,
}

impl PodReconciler {
    pub fn new(client: Client, sync: Arc<PodAnnotationReconciler>) -> Self {
        Self { client, sync }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(pods, watcher::Config::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled pod: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(pod: Arc<Pod>, ctx: Arc<PodReconciler>) -> Result<Action> {
    let key = ObjectKey::for_object(pod.as_ref())
        .ok_or_else(|| SyncError::MissingNamespace(pod.name_any()))?;

    // The cached copy is enough to skip Pods that reference no ConfigMap
    if !pod
        .annotations()
        .contains_key(&ctx.sync.keys().reference_annotation)
    {
        return Ok(Action::await_change());
    }

    let outcome = ctx.sync.reconcile(&key).await?;
    debug!("Pod {}: {:?}", key, outcome);

    Ok(Action::await_change())
}

fn error_policy(_pod: Arc<Pod>, error: &SyncError, _ctx: Arc<PodReconciler>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}

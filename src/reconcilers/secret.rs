// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - any Secret event, or an eligible Namespace event,
//! triggers a full replication pass of the canonical secret.

use crate::config::Keys;
use crate::constants::timing::ERROR_REQUEUE_SECS;
use crate::error::{Result, SyncError};
use crate::kubernetes::is_eligible;
use crate::sync::SecretReplicationReconciler;
use crate::types::ObjectKey;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct SecretReconciler {
    client: Client,
    sync: SecretReplicationReconciler,
}

impl SecretReconciler {
    pub fn new(client: Client, sync: SecretReplicationReconciler) -> Self {
        Self { client, sync }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let keys = self.sync.keys().clone();
        let context = Arc::new(self);

        Controller::new(secrets, WatcherConfig::default())
            // A namespace gaining the sync label needs a replica even if no secret changes
            .watches(namespaces, WatcherConfig::default(), move |ns| {
                namespace_trigger(&ns, &keys)
            })
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled secret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// Map a Namespace event onto the canonical secret, if the namespace is eligible
pub fn namespace_trigger(namespace: &Namespace, keys: &Keys) -> Option<ObjectRef<Secret>> {
    is_eligible(namespace, &keys.sync_label, &keys.sync_label_value).then(|| {
        debug!(
            "Namespace {} is eligible, triggering secret sync",
            namespace.name_any()
        );
        ObjectRef::new(&keys.canonical_name).within(&keys.canonical_namespace)
    })
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<SecretReconciler>) -> Result<Action> {
    let key = ObjectKey::for_object(secret.as_ref())
        .ok_or_else(|| SyncError::MissingNamespace(secret.name_any()))?;

    let report = ctx.sync.reconcile(&key).await?;
    for failure in &report.failures {
        warn!(
            "Secret not synced to namespace {}: {}",
            failure.namespace, failure.error
        );
    }

    Ok(Action::await_change())
}

fn error_policy(_secret: Arc<Secret>, error: &SyncError, _ctx: Arc<SecretReconciler>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}

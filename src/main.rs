// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kubemirror::config::Config;
use kubemirror::kubernetes::KubeStore;
use kubemirror::reconcilers::{ConfigMapReconciler, PodReconciler, SecretReconciler};
use kubemirror::sync::{EventRouter, PodAnnotationReconciler, SecretReplicationReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting kubemirror operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: reference_annotation={}, sync_label={}, canonical_secret={}/{}",
        config.keys.reference_annotation,
        config.keys.sync_label,
        config.keys.canonical_namespace,
        config.keys.canonical_name
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let store = Arc::new(KubeStore::new(client.clone(), config.request_timeout));
    let mut controllers: Vec<BoxFuture<'static, Result<()>>> = Vec::new();

    if config.enable_pod_sync {
        let pod_sync = Arc::new(PodAnnotationReconciler::new(
            store.clone(),
            config.keys.clone(),
        ));
        let router = EventRouter::new(store.clone(), config.keys.clone());

        controllers.push(PodReconciler::new(client.clone(), pod_sync.clone()).run().boxed());
        controllers.push(ConfigMapReconciler::new(client.clone(), router, pod_sync).run().boxed());
        info!("Pod annotation sync enabled");
    }

    if config.enable_secret_sync {
        let secret_sync = SecretReplicationReconciler::new(store.clone(), config.keys.clone());
        controllers.push(SecretReconciler::new(client.clone(), secret_sync).run().boxed());
        info!("Secret replication enabled");
    }

    if controllers.is_empty() {
        warn!("Both ENABLE_POD_SYNC and ENABLE_SECRET_SYNC are false, nothing to do");
        return Ok(());
    }

    info!("Starting reconcilers...");
    futures::future::try_join_all(controllers).await?;

    warn!("All reconcilers stopped");
    Ok(())
}

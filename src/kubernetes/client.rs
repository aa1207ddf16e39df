// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Store implementation backed by the Kubernetes API

use crate::constants::OPERATOR_NAME;
use crate::error::StoreError;
use crate::kubernetes::store::{SecretStore, WorkloadStore};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

/// Live cluster store. Every call is bounded by `request_timeout`.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    request_timeout: Duration,
}

impl KubeStore {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        }
    }

    async fn bounded<T, F>(
        &self,
        kind: &'static str,
        namespace: &str,
        name: &str,
        call: F,
    ) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result.map_err(|e| map_kube_error(e, kind, namespace, name)),
            Err(_) => Err(StoreError::Transient(format!(
                "{} {}/{} request timed out after {:?}",
                kind, namespace, name, self.request_timeout
            ))),
        }
    }
}

/// Translate a kube error into the store's error kinds
pub fn map_kube_error(err: kube::Error, kind: &'static str, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => StoreError::not_found(kind, namespace, name),
        kube::Error::Api(resp) if resp.code == 409 => StoreError::Conflict(format!(
            "{} {}/{}: {}",
            kind, namespace, name, resp.message
        )),
        other => StoreError::Transient(format!("{} {}/{}: {}", kind, namespace, name, other)),
    }
}

#[async_trait]
impl WorkloadStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, StoreError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.bounded("Pod", namespace, name, pods.get(name)).await
    }

    #[instrument(skip(self))]
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, StoreError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = self
            .bounded("Pod", namespace, "*", pods.list(&ListParams::default()))
            .await?;
        debug!("Listed {} pods in namespace {}", list.items.len(), namespace);
        Ok(list.items)
    }

    #[instrument(skip(self, pod), fields(pod = %pod.name_any()))]
    async fn update_pod(&self, pod: &Pod) -> Result<(), StoreError> {
        let namespace = pod.namespace().unwrap_or_default();
        let name = pod.name_any();
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace);
        self.bounded(
            "Pod",
            &namespace,
            &name,
            pods.replace(&name, &Self::post_params(), pod),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap, StoreError> {
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        self.bounded("ConfigMap", namespace, name, config_maps.get(name))
            .await
    }
}

#[async_trait]
impl SecretStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        self.bounded("Secret", namespace, name, secrets.get(name)).await
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        self.bounded(
            "Secret",
            &namespace,
            &name,
            secrets.create(&Self::post_params(), secret),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        self.bounded(
            "Secret",
            &namespace,
            &name,
            secrets.replace(&name, &Self::post_params(), secret),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = self
            .bounded("Namespace", "", "*", namespaces.list(&ListParams::default()))
            .await?;
        Ok(list.items)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Narrow store capabilities consumed by the reconcilers.
//!
//! Each reconciler holds only the trait it needs, so tests can substitute an
//! in-memory fake or a mock without a running cluster.

use crate::error::StoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};

#[cfg(test)]
use mockall::automock;

/// Store operations used by the Pod annotation loop
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkloadStore: Send + Sync {
    /// Get a Pod by namespace and name
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, StoreError>;

    /// List all Pods in a namespace
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, StoreError>;

    /// Replace a Pod with the given object.
    ///
    /// The object's resourceVersion is sent along, so a concurrent write
    /// surfaces as [`StoreError::Conflict`].
    async fn update_pod(&self, pod: &Pod) -> Result<(), StoreError>;

    /// Get a ConfigMap by namespace and name
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap, StoreError>;
}

/// Store operations used by the secret replication loop
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get a Secret by namespace and name
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError>;

    /// Create a Secret; fails with [`StoreError::Conflict`] if it already exists
    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError>;

    /// Replace an existing Secret
    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError>;

    /// List every Namespace in the cluster
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError>;
}

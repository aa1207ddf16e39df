// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: object builders, an in-memory store, and a mock HTTP
//! service for driving a real `kube::Client`.

use crate::error::StoreError;
use crate::kubernetes::{SecretStore, WorkloadStore};
use crate::types::ObjectKey;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn make_pod(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: (!annotations.is_empty()).then(|| string_map(annotations)),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn make_config_map(namespace: &str, name: &str, data: Option<&[(&str, &str)]>) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: data.map(string_map),
        ..Default::default()
    }
}

pub fn make_namespace(name: &str, labels: &[(&str, &str)]) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: (!labels.is_empty()).then(|| string_map(labels)),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn secret_data(pairs: &[(&str, &str)]) -> BTreeMap<String, ByteString> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
        .collect()
}

pub fn make_secret(namespace: &str, name: &str, data: &[(&str, &str)], type_: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(secret_data(data)),
        type_: Some(type_.to_string()),
        ..Default::default()
    }
}

/// A write observed by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    UpdatePod(ObjectKey),
    CreateSecret(ObjectKey),
    UpdateSecret(ObjectKey),
}

#[derive(Default)]
struct MemoryState {
    pods: BTreeMap<ObjectKey, Pod>,
    config_maps: BTreeMap<ObjectKey, ConfigMap>,
    secrets: BTreeMap<ObjectKey, Secret>,
    namespaces: Vec<Namespace>,
    writes: Vec<WriteOp>,
    fail_list_pods: Option<StoreError>,
    fail_pod_update: Option<StoreError>,
    fail_config_map_get: Option<StoreError>,
    fail_list_namespaces: Option<StoreError>,
    fail_secret_get: HashMap<String, StoreError>,
    fail_secret_write: HashMap<String, StoreError>,
}

/// In-memory store with resourceVersion tracking and per-operation failure
/// injection. Writes carrying a stale resourceVersion fail with a conflict.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

fn key_of<K: kube::Resource>(obj: &K) -> ObjectKey {
    ObjectKey::new(obj.namespace().unwrap_or_default(), obj.name_any())
}

fn bump_version(meta: &mut ObjectMeta) {
    let next = meta
        .resource_version
        .as_deref()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(1, |v| v + 1);
    meta.resource_version = Some(next.to_string());
}

fn check_version(
    stored: Option<&ObjectMeta>,
    incoming: &ObjectMeta,
    key: &ObjectKey,
) -> Result<(), StoreError> {
    match (stored.and_then(|m| m.resource_version.as_ref()), incoming.resource_version.as_ref()) {
        (Some(current), Some(sent)) if current != sent => Err(StoreError::Conflict(format!(
            "{} modified: have {}, got {}",
            key, current, sent
        ))),
        _ => Ok(()),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut MemoryState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_pod(self, mut pod: Pod) -> Self {
        bump_version(&mut pod.metadata);
        self.with_state(|s| {
            s.pods.insert(key_of(&pod), pod);
        })
    }

    pub fn with_config_map(self, config_map: ConfigMap) -> Self {
        self.put_config_map(config_map);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.put_secret(secret);
        self
    }

    pub fn with_namespace(self, namespace: Namespace) -> Self {
        self.with_state(|s| s.namespaces.push(namespace))
    }

    pub fn failing_list_pods(self, err: StoreError) -> Self {
        self.with_state(|s| s.fail_list_pods = Some(err))
    }

    pub fn failing_pod_update(self, err: StoreError) -> Self {
        self.with_state(|s| s.fail_pod_update = Some(err))
    }

    pub fn failing_config_map_get(self, err: StoreError) -> Self {
        self.with_state(|s| s.fail_config_map_get = Some(err))
    }

    pub fn failing_list_namespaces(self, err: StoreError) -> Self {
        self.with_state(|s| s.fail_list_namespaces = Some(err))
    }

    /// Fail secret reads in `namespace`
    pub fn failing_secret_get(self, namespace: &str, err: StoreError) -> Self {
        self.with_state(|s| {
            s.fail_secret_get.insert(namespace.to_string(), err);
        })
    }

    /// Fail secret creates and updates in `namespace`
    pub fn failing_secret_write(self, namespace: &str, err: StoreError) -> Self {
        self.with_state(|s| {
            s.fail_secret_write.insert(namespace.to_string(), err);
        })
    }

    /// Insert or replace a ConfigMap without recording a write
    pub fn put_config_map(&self, config_map: ConfigMap) {
        let mut state = self.state.lock().unwrap();
        state.config_maps.insert(key_of(&config_map), config_map);
    }

    /// Insert or replace a Secret out of band, as a user would
    pub fn put_secret(&self, mut secret: Secret) {
        let mut state = self.state.lock().unwrap();
        let key = key_of(&secret);
        secret.metadata.resource_version = state
            .secrets
            .get(&key)
            .and_then(|s| s.metadata.resource_version.clone());
        bump_version(&mut secret.metadata);
        state.secrets.insert(key, secret);
    }

    pub fn remove_secret(&self, namespace: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.secrets.remove(&ObjectKey::new(namespace, name));
    }

    pub fn pod(&self, namespace: &str, name: &str) -> Option<Pod> {
        let state = self.state.lock().unwrap();
        state.pods.get(&ObjectKey::new(namespace, name)).cloned()
    }

    pub fn pod_annotations(&self, namespace: &str, name: &str) -> BTreeMap<String, String> {
        self.pod(namespace, name)
            .and_then(|p| p.metadata.annotations)
            .unwrap_or_default()
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&ObjectKey::new(namespace, name)).cloned()
    }

    pub fn writes(&self) -> Vec<WriteOp> {
        self.state.lock().unwrap().writes.clone()
    }
}

#[async_trait]
impl WorkloadStore for MemoryStore {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, StoreError> {
        self.pod(namespace, name)
            .ok_or_else(|| StoreError::not_found("Pod", namespace, name))
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, StoreError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_list_pods {
            return Err(err.clone());
        }
        Ok(state
            .pods
            .iter()
            .filter(|(k, _)| k.namespace == namespace)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn update_pod(&self, pod: &Pod) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_pod_update {
            return Err(err.clone());
        }
        let key = key_of(pod);
        let Some(stored) = state.pods.get(&key) else {
            return Err(StoreError::not_found("Pod", &key.namespace, &key.name));
        };
        check_version(Some(&stored.metadata), &pod.metadata, &key)?;
        let mut updated = pod.clone();
        updated.metadata.resource_version = stored.metadata.resource_version.clone();
        bump_version(&mut updated.metadata);
        state.pods.insert(key.clone(), updated);
        state.writes.push(WriteOp::UpdatePod(key));
        Ok(())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap, StoreError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_config_map_get {
            return Err(err.clone());
        }
        state
            .config_maps
            .get(&ObjectKey::new(namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::not_found("ConfigMap", namespace, name))
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = state.fail_secret_get.get(namespace) {
            return Err(err.clone());
        }
        state
            .secrets
            .get(&ObjectKey::new(namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Secret", namespace, name))
    }

    async fn create_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(secret);
        if let Some(err) = state.fail_secret_write.get(&key.namespace) {
            return Err(err.clone());
        }
        if state.secrets.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{} already exists", key)));
        }
        let mut created = secret.clone();
        created.metadata.resource_version = None;
        bump_version(&mut created.metadata);
        state.secrets.insert(key.clone(), created);
        state.writes.push(WriteOp::CreateSecret(key));
        Ok(())
    }

    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let key = key_of(secret);
        if let Some(err) = state.fail_secret_write.get(&key.namespace) {
            return Err(err.clone());
        }
        let Some(stored) = state.secrets.get(&key) else {
            return Err(StoreError::not_found("Secret", &key.namespace, &key.name));
        };
        check_version(Some(&stored.metadata), &secret.metadata, &key)?;
        let mut updated = secret.clone();
        updated.metadata.resource_version = stored.metadata.resource_version.clone();
        bump_version(&mut updated.metadata);
        state.secrets.insert(key.clone(), updated);
        state.writes.push(WriteOp::UpdateSecret(key));
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_list_namespaces {
            return Err(err.clone());
        }
        Ok(state.namespaces.clone())
    }
}

/// A mock HTTP service that returns predefined responses based on request
/// method and path, and records every request it sees.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
    hang: bool,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            hang: false,
        }
    }

    /// A service that records requests but never answers them
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Requests received so far as (method, path) pairs
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("resource", &path)));
        let hang = self.hang;

        Box::pin(async move {
            if hang {
                futures::future::pending::<()>().await;
            }
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

pub fn pod_json(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> String {
    serde_json::to_string(&make_pod(namespace, name, annotations)).unwrap()
}

pub fn config_map_json(namespace: &str, name: &str, data: Option<&[(&str, &str)]>) -> String {
    serde_json::to_string(&make_config_map(namespace, name, data)).unwrap()
}

pub fn namespace_json(name: &str, labels: &[(&str, &str)]) -> String {
    serde_json::to_string(&make_namespace(name, labels)).unwrap()
}

/// Wrap serialized objects into a `<kind>` list response
pub fn list_json(kind: &str, items: Vec<String>) -> String {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|i| serde_json::from_str(i).unwrap())
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Create a Status failure response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

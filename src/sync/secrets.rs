// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create-or-update of a single replica secret

use crate::error::StoreError;
use crate::kubernetes::SecretStore;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Structural equality of two secret payloads, key by key and byte by byte.
/// A missing payload and an empty one are the same payload.
pub fn data_equal(
    a: Option<&BTreeMap<String, ByteString>>,
    b: Option<&BTreeMap<String, ByteString>>,
) -> bool {
    let a = a.into_iter().flatten();
    let b = b.into_iter().flatten();
    a.map(|(k, v)| (k, &v.0)).eq(b.map(|(k, v)| (k, &v.0)))
}

/// The replica that should exist in `namespace`: same name, data and type as the canonical secret
pub fn desired_replica(canonical: &Secret, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(canonical.name_any()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: canonical.data.clone(),
        type_: canonical.type_.clone(),
        ..Default::default()
    }
}

/// Make sure `namespace` holds a replica of `canonical`.
///
/// An existing replica is rewritten only when its data differs; a diverging
/// type alone is left in place. All other fields of an existing replica are
/// preserved. Load errors other than not-found are returned untouched.
#[instrument(skip(store, canonical), fields(secret = %canonical.name_any()))]
pub async fn upsert_replica(
    store: &dyn SecretStore,
    namespace: &str,
    canonical: &Secret,
) -> Result<UpsertOutcome, StoreError> {
    let desired = desired_replica(canonical, namespace);
    let name = desired.name_any();

    let mut existing = match store.get_secret(namespace, &name).await {
        Ok(existing) => existing,
        Err(e) if e.is_not_found() => {
            store.create_secret(&desired).await?;
            info!("Created secret {}/{}", namespace, name);
            return Ok(UpsertOutcome::Created);
        }
        Err(e) => return Err(e),
    };

    if data_equal(existing.data.as_ref(), desired.data.as_ref()) {
        debug!("Secret {}/{} already up to date", namespace, name);
        return Ok(UpsertOutcome::Unchanged);
    }

    existing.data = desired.data;
    existing.type_ = desired.type_;
    store.update_secret(&existing).await?;
    info!("Updated secret {}/{}", namespace, name);
    Ok(UpsertOutcome::Updated)
}

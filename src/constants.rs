// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Pod annotation keys used by the config projection loop
pub mod annotations {
    /// Names the ConfigMap (same namespace) whose data is projected onto the Pod
    pub const REFERENCE: &str = "configmap-name";
    /// Prefix of every annotation derived from ConfigMap data
    pub const DERIVED_PREFIX: &str = "data.";
    /// Set when the referenced ConfigMap carries no data
    pub const SENTINEL_KEY: &str = "data";
    pub const SENTINEL_VALUE: &str = "empty";
}

/// Namespace labels and identities used by the secret replication loop
pub mod secrets {
    /// Namespaces with this label set to [`SYNC_LABEL_VALUE`] receive a replica
    pub const SYNC_LABEL: &str = "secret-sync";
    pub const SYNC_LABEL_VALUE: &str = "true";
    /// Fixed identity of the canonical secret
    pub const CANONICAL_NAMESPACE: &str = "default";
    pub const CANONICAL_NAME: &str = "central-secret";
}

/// The operator name used as field manager and in logs
pub const OPERATOR_NAME: &str = "kubemirror";

/// Timing configuration
pub mod timing {
    /// Upper bound for a single store round-trip
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Requeue delay after a propagated reconciliation error
    pub const ERROR_REQUEUE_SECS: u64 = 60;
}

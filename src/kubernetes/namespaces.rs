// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace eligibility for secret replication

use k8s_openapi::api::core::v1::Namespace;

/// Check if a namespace carries `label` set to exactly `value`.
/// No truthy coercion: `"True"` or `"1"` do not match `"true"`.
pub fn is_eligible(namespace: &Namespace, label: &str, value: &str) -> bool {
    namespace
        .metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(label))
        .is_some_and(|v| v == value)
}

/// Select the eligible namespaces, preserving listing order
pub fn eligible_namespaces(namespaces: Vec<Namespace>, label: &str, value: &str) -> Vec<Namespace> {
    namespaces
        .into_iter()
        .filter(|ns| is_eligible(ns, label, value))
        .collect()
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, secrets, timing};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Fixed annotation keys, labels and identities shared by both loops.
///
/// These must match existing deployments bit-for-bit, so the defaults are
/// rarely overridden outside of tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    pub reference_annotation: String,
    pub derived_prefix: String,
    pub sentinel_key: String,
    pub sentinel_value: String,
    pub sync_label: String,
    pub sync_label_value: String,
    pub canonical_namespace: String,
    pub canonical_name: String,
}

impl Default for Keys {
    fn default() -> Self {
        Keys {
            reference_annotation: annotations::REFERENCE.to_string(),
            derived_prefix: annotations::DERIVED_PREFIX.to_string(),
            sentinel_key: annotations::SENTINEL_KEY.to_string(),
            sentinel_value: annotations::SENTINEL_VALUE.to_string(),
            sync_label: secrets::SYNC_LABEL.to_string(),
            sync_label_value: secrets::SYNC_LABEL_VALUE.to_string(),
            canonical_namespace: secrets::CANONICAL_NAMESPACE.to_string(),
            canonical_name: secrets::CANONICAL_NAME.to_string(),
        }
    }
}

/// Operator configuration loaded from an optional YAML file and environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub keys: Keys,
    /// Upper bound for every store round-trip
    pub request_timeout: Duration,
    pub enable_pod_sync: bool,
    pub enable_secret_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keys: Keys::default(),
            request_timeout: Duration::from_secs(timing::REQUEST_TIMEOUT_SECS),
            enable_pod_sync: true,
            enable_secret_sync: true,
        }
    }
}

/// Shape of the file pointed at by `KUBEMIRROR_CONFIG`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FileConfig {
    reference_annotation: Option<String>,
    derived_prefix: Option<String>,
    sentinel_key: Option<String>,
    sentinel_value: Option<String>,
    sync_label: Option<String>,
    sync_label_value: Option<String>,
    canonical_secret_namespace: Option<String>,
    canonical_secret_name: Option<String>,
    request_timeout_secs: Option<u64>,
    enable_pod_sync: Option<bool>,
    enable_secret_sync: Option<bool>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Environment values override values from the config file.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup("KUBEMIRROR_CONFIG") {
            Some(path) => read_file_config(Path::new(&path))?,
            None => FileConfig::default(),
        };
        let defaults = Config::default();

        let string = |var: &str, from_file: Option<String>, default: String| {
            lookup(var).or(from_file).unwrap_or(default)
        };
        let flag = |var: &str, from_file: Option<bool>| -> Result<bool> {
            match lookup(var) {
                Some(v) => v
                    .parse::<bool>()
                    .with_context(|| format!("{} must be true or false, got {:?}", var, v)),
                None => Ok(from_file.unwrap_or(true)),
            }
        };

        let keys = Keys {
            reference_annotation: string(
                "REFERENCE_ANNOTATION",
                file.reference_annotation,
                defaults.keys.reference_annotation,
            ),
            derived_prefix: string(
                "DERIVED_PREFIX",
                file.derived_prefix,
                defaults.keys.derived_prefix,
            ),
            sentinel_key: string("SENTINEL_KEY", file.sentinel_key, defaults.keys.sentinel_key),
            sentinel_value: string(
                "SENTINEL_VALUE",
                file.sentinel_value,
                defaults.keys.sentinel_value,
            ),
            sync_label: string("SYNC_LABEL", file.sync_label, defaults.keys.sync_label),
            sync_label_value: string(
                "SYNC_LABEL_VALUE",
                file.sync_label_value,
                defaults.keys.sync_label_value,
            ),
            canonical_namespace: string(
                "CANONICAL_SECRET_NAMESPACE",
                file.canonical_secret_namespace,
                defaults.keys.canonical_namespace,
            ),
            canonical_name: string(
                "CANONICAL_SECRET_NAME",
                file.canonical_secret_name,
                defaults.keys.canonical_name,
            ),
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a number, got {:?}", v))?,
            None => file
                .request_timeout_secs
                .unwrap_or(timing::REQUEST_TIMEOUT_SECS),
        };

        Ok(Config {
            keys,
            request_timeout: Duration::from_secs(request_timeout_secs),
            enable_pod_sync: flag("ENABLE_POD_SYNC", file.enable_pod_sync)?,
            enable_secret_sync: flag("ENABLE_SECRET_SYNC", file.enable_secret_sync)?,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

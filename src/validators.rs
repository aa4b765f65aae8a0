// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes naming rules for object metadata.

use crate::error::ProviderError;
use crate::wait::parse_timeout;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;
const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

static DNS1123_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

static DNS1123_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").expect("valid regex")
});

static QUALIFIED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("valid regex"));

/// Checks attached to schema attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Object names, DNS-1123 subdomain
    ResourceName,
    /// Namespace names, DNS-1123 label
    Namespace,
    Labels,
    Annotations,
    /// humantime duration such as `30s` or `5m`
    Duration,
}

impl Validator {
    /// Problems found in `value`, empty when valid. Values of the wrong JSON
    /// type are left to the schema type check.
    pub fn check(&self, value: &Value) -> Vec<String> {
        match (self, value) {
            (Validator::ResourceName, Value::String(s)) => validate_dns1123_subdomain(s),
            (Validator::Namespace, Value::String(s)) => validate_dns1123_label(s),
            (Validator::Labels, Value::Object(map)) => map
                .iter()
                .flat_map(|(key, value)| {
                    let mut errors = validate_qualified_name(key);
                    if let Value::String(v) = value {
                        errors.extend(validate_label_value(v));
                    }
                    errors
                })
                .collect(),
            (Validator::Annotations, Value::Object(map)) => {
                let mut errors: Vec<String> =
                    map.keys().flat_map(|key| validate_qualified_name(key)).collect();
                let total: usize = map
                    .iter()
                    .map(|(k, v)| k.len() + v.as_str().map_or(0, str::len))
                    .sum();
                if total > TOTAL_ANNOTATION_SIZE_LIMIT {
                    errors.push(format!(
                        "annotations total {} bytes, must have at most {} bytes",
                        total, TOTAL_ANNOTATION_SIZE_LIMIT
                    ));
                }
                errors
            }
            (Validator::Duration, Value::String(s)) => match parse_timeout(s) {
                Ok(_) => Vec::new(),
                Err(ProviderError::InvalidTimeout { value, message }) => {
                    vec![format!("'{}' is not a valid duration: {}", value, message)]
                }
                Err(other) => vec![other.to_string()],
            },
            _ => Vec::new(),
        }
    }
}

pub fn validate_dns1123_label(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        errors.push(format!(
            "'{}' must be no more than {} characters",
            value, DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        errors.push(format!(
            "'{}' must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character",
            value
        ));
    }
    errors
}

pub fn validate_dns1123_subdomain(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(format!(
            "'{}' must be no more than {} characters",
            value, DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        errors.push(format!(
            "'{}' must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character",
            value
        ));
    }
    errors
}

/// Label and annotation keys: `[prefix/]name`
pub fn validate_qualified_name(value: &str) -> Vec<String> {
    let (prefix, name) = match value.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, value),
    };

    let mut errors = Vec::new();
    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            errors.push(format!("'{}': prefix part must be non-empty", value));
        } else {
            errors.extend(
                validate_dns1123_subdomain(prefix)
                    .into_iter()
                    .map(|e| format!("'{}': prefix part {}", value, e)),
            );
        }
    }

    if name.is_empty() {
        errors.push(format!("'{}': name part must be non-empty", value));
    } else {
        if name.len() > QUALIFIED_NAME_MAX_LENGTH {
            errors.push(format!(
                "'{}': name part must be no more than {} characters",
                value, QUALIFIED_NAME_MAX_LENGTH
            ));
        }
        if !QUALIFIED_NAME.is_match(name) {
            errors.push(format!(
                "'{}': name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
                value
            ));
        }
    }
    errors
}

pub fn validate_label_value(value: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if value.is_empty() {
        return errors;
    }
    if value.len() > LABEL_VALUE_MAX_LENGTH {
        errors.push(format!(
            "label value '{}' must be no more than {} characters",
            value, LABEL_VALUE_MAX_LENGTH
        ));
    }
    if !QUALIFIED_NAME.is_match(value) {
        errors.push(format!(
            "label value '{}' must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
            value
        ));
    }
    errors
}

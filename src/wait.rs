// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Polling an applied object until it reaches a wanted state.

use crate::constants::wait::{DEFAULT_TIMEOUT, POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::{ProviderError, Result};
use crate::kubernetes::DynamicClient;
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// The `wait_for` block of a resource
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WaitFor {
    /// JSONPath expression → expected value. Path segments are split on
    /// `.`, so keys that contain dots (e.g. `example.com/x`) cannot be
    /// addressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonpath: Option<BTreeMap<String, String>>,
    /// Condition type → expected status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl WaitFor {
    pub fn is_empty(&self) -> bool {
        self.jsonpath.as_ref().map_or(true, BTreeMap::is_empty)
            && self.conditions.as_ref().map_or(true, BTreeMap::is_empty)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_timeout(self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Checks that do not hold yet for `object`, empty when satisfied
    pub fn unmet(&self, object: &Value) -> Vec<String> {
        let mut unmet = Vec::new();
        for (path, expected) in self.jsonpath.iter().flatten() {
            match lookup(object, path) {
                Some(actual) if actual == *expected => {}
                Some(actual) => unmet.push(format!("{} is '{}', want '{}'", path, actual, expected)),
                None => unmet.push(format!("{} is not set, want '{}'", path, expected)),
            }
        }
        for (condition, expected) in self.conditions.iter().flatten() {
            match condition_status(object, condition) {
                Some(actual) if actual == expected => {}
                Some(actual) => unmet.push(format!(
                    "condition {} is '{}', want '{}'",
                    condition, actual, expected
                )),
                None => unmet.push(format!("condition {} not reported, want '{}'", condition, expected)),
            }
        }
        unmet
    }
}

/// Parse a humantime duration that can be added to the current instant
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let invalid = |message: String| ProviderError::InvalidTimeout {
        value: raw.to_string(),
        message,
    };
    let timeout = humantime::parse_duration(raw).map_err(|e| invalid(e.to_string()))?;
    Instant::now()
        .checked_add(timeout)
        .ok_or_else(|| invalid("duration is too large".to_string()))?;
    Ok(timeout)
}

/// Resolve a simple JSONPath like `{.status.phase}` or `status.items[0].name`
/// and render the value as a string.
pub fn lookup(object: &Value, path: &str) -> Option<String> {
    let trimmed = path.trim();
    let trimmed = trimmed
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);

    let mut current = object;
    for segment in trimmed.split('.').filter(|s| !s.is_empty()) {
        let (field, indexes) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };
        if !field.is_empty() {
            current = current.get(field)?;
        }
        for index in indexes.split('[').skip(1) {
            let index: usize = index.strip_suffix(']')?.trim().parse().ok()?;
            current = current.get(index)?;
        }
    }

    match current {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn condition_status<'a>(object: &'a Value, condition: &str) -> Option<&'a str> {
    object
        .get("status")?
        .get("conditions")?
        .as_array()?
        .iter()
        .find(|c| c.get("type").and_then(Value::as_str) == Some(condition))?
        .get("status")?
        .as_str()
}

/// Re-read the object until `wait_for` is satisfied or the timeout passes.
/// Uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
#[instrument(skip(client, ar, wait_for), fields(kind = %ar.kind))]
pub async fn wait_until_ready(
    client: &DynamicClient,
    ar: &ApiResource,
    namespace: &str,
    name: &str,
    wait_for: &WaitFor,
) -> Result<DynamicObject> {
    let timeout = wait_for.timeout()?;
    let deadline = Instant::now().checked_add(timeout).ok_or_else(|| ProviderError::InvalidTimeout {
        value: humantime::format_duration(timeout).to_string(),
        message: "duration is too large".to_string(),
    })?;
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        let object = client.get(ar, namespace, name).await?;
        let value = serde_json::to_value(&object).map_err(ProviderError::Marshal)?;
        let unmet = wait_for.unmet(&value);

        if unmet.is_empty() {
            info!("{} {}/{} reached the wanted state", ar.kind, namespace, name);
            return Ok(object);
        }

        let now = Instant::now();
        if now >= deadline {
            warn!(
                "Gave up waiting for {} {}/{}: {}",
                ar.kind,
                namespace,
                name,
                unmet.join(", ")
            );
            return Err(ProviderError::WaitTimeout {
                kind: ar.kind.clone(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                timeout: humantime::format_duration(timeout).to_string(),
            });
        }

        debug!(
            "Waiting {} seconds for {} {}/{}: {}",
            interval,
            ar.kind,
            namespace,
            name,
            unmet.join(", ")
        );
        sleep(Duration::from_secs(interval).min(deadline - now)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

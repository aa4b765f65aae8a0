// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Untyped access to namespaced objects, keyed by their `ApiResource`

use crate::error::{ProviderError, Result};
use kube::api::{Api, DeleteParams, DynamicObject, Patch, PatchParams};
use kube::discovery::ApiResource;
use kube::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Thin wrapper around `Api<DynamicObject>` used by every resource kind.
#[derive(Clone)]
pub struct DynamicClient {
    client: Client,
}

impl DynamicClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, ar: &ApiResource, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, ar)
    }

    #[instrument(skip(self, ar), fields(kind = %ar.kind))]
    pub async fn get(&self, ar: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject> {
        debug!("Getting {} {}/{}", ar.kind, namespace, name);
        self.api(ar, namespace)
            .get(name)
            .await
            .map_err(|source| ProviderError::GetNamespacedResource {
                kind: ar.kind.clone(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })
    }

    /// Server-side apply `body` under `field_manager`
    #[instrument(skip(self, ar, body), fields(kind = %ar.kind))]
    pub async fn apply(
        &self,
        ar: &ApiResource,
        namespace: &str,
        name: &str,
        body: &Value,
        field_manager: &str,
        force: bool,
    ) -> Result<DynamicObject> {
        let mut pp = PatchParams::apply(field_manager);
        if force {
            pp = pp.force();
        }

        let applied = self
            .api(ar, namespace)
            .patch(name, &pp, &Patch::Apply(body))
            .await
            .map_err(|source| ProviderError::PatchResource {
                kind: ar.kind.clone(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        info!(
            "Applied {} {}/{} as {} (force={})",
            ar.kind, namespace, name, field_manager, force
        );
        Ok(applied)
    }

    #[instrument(skip(self, ar), fields(kind = %ar.kind))]
    pub async fn delete(&self, ar: &ApiResource, namespace: &str, name: &str) -> Result<()> {
        self.api(ar, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|source| ProviderError::DeleteResource {
                kind: ar.kind.clone(),
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        info!("Deleted {} {}/{}", ar.kind, namespace, name);
        Ok(())
    }
}

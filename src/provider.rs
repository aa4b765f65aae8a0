// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provider configuration and the registry of resources and data sources.

use crate::config::Config;
use crate::constants::DEFAULT_FIELD_MANAGER;
use crate::crds::keycloak::KeycloakRealmImport;
use crate::crds::kms::{Alias, Grant, Key};
use crate::datasource::{CrdDataSource, DataSource};
use crate::error::{ProviderError, Result};
use crate::kubernetes::{create_client, DynamicClient};
use crate::manifest::CrdManifest;
use crate::resource::{CrdResource, Resource};
use kube::Client;
use std::sync::Arc;
use tracing::{info, instrument};

/// Shared state handed to every resource and data source at configure time
pub struct ProviderData {
    client: Option<DynamicClient>,
    pub field_manager: String,
    pub force_conflicts: bool,
    pub offline: bool,
}

impl ProviderData {
    pub fn from_config(config: &Config, client: Option<Client>) -> Self {
        Self {
            client: client.map(DynamicClient::new),
            field_manager: config.field_manager.clone(),
            force_conflicts: config.force_conflicts,
            offline: config.offline,
        }
    }

    pub fn for_client(client: Client) -> Self {
        Self {
            client: Some(DynamicClient::new(client)),
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            client: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            offline: true,
        }
    }

    /// Client for a cluster `operation`, refused in offline mode
    pub fn client(&self, operation: &'static str) -> Result<&DynamicClient> {
        if self.offline {
            return Err(ProviderError::OfflineMode(operation));
        }
        self.client.as_ref().ok_or(ProviderError::Unconfigured)
    }
}

pub struct Provider {
    data: Arc<ProviderData>,
}

impl Provider {
    /// Build the provider, connecting to the cluster unless offline
    #[instrument(skip(config), fields(offline = config.offline))]
    pub async fn configure(config: &Config) -> Result<Self> {
        let client = if config.offline {
            info!("Offline mode: only manifests can be rendered");
            None
        } else {
            Some(create_client(config).await?)
        };
        Ok(Self::with_data(ProviderData::from_config(config, client)))
    }

    pub fn with_data(data: ProviderData) -> Self {
        Self { data: Arc::new(data) }
    }

    /// Every resource, unconfigured
    pub fn resources() -> Vec<Box<dyn Resource>> {
        vec![
            Box::new(CrdResource::<Key>::waitable()),
            Box::new(CrdResource::<Grant>::new()),
            Box::new(CrdResource::<Alias>::new()),
            Box::new(CrdResource::<KeycloakRealmImport>::waitable()),
        ]
    }

    /// Every data source, unconfigured. Each kind has a reader and a manifest.
    pub fn data_sources() -> Vec<Box<dyn DataSource>> {
        vec![
            Box::new(CrdDataSource::<Key>::new()),
            Box::new(CrdManifest::<Key>::new()),
            Box::new(CrdDataSource::<Grant>::new()),
            Box::new(CrdManifest::<Grant>::new()),
            Box::new(CrdDataSource::<Alias>::new()),
            Box::new(CrdManifest::<Alias>::new()),
            Box::new(CrdDataSource::<KeycloakRealmImport>::new()),
            Box::new(CrdManifest::<KeycloakRealmImport>::new()),
        ]
    }

    /// Configured resource for `type_name`
    pub fn resource(&self, type_name: &str) -> Result<Box<dyn Resource>> {
        let mut resource = Self::resources()
            .into_iter()
            .find(|r| r.type_name() == type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))?;
        resource.configure(self.data.clone());
        Ok(resource)
    }

    /// Configured data source for `type_name`
    pub fn data_source(&self, type_name: &str) -> Result<Box<dyn DataSource>> {
        let mut data_source = Self::data_sources()
            .into_iter()
            .find(|d| d.type_name() == type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))?;
        data_source.configure(self.data.clone());
        Ok(data_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{object_json, MockService};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_type_names_are_unique() {
        let mut names: Vec<String> = Provider::resources().iter().map(|r| r.type_name()).collect();
        names.extend(Provider::data_sources().iter().map(|d| d.type_name()));
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(names.len(), 12);
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_registry_contents() {
        let resources: Vec<String> = Provider::resources().iter().map(|r| r.type_name()).collect();
        assert_eq!(
            resources,
            vec![
                "k8s_kms_services_k8s_aws_key_v1alpha1",
                "k8s_kms_services_k8s_aws_grant_v1alpha1",
                "k8s_kms_services_k8s_aws_alias_v1alpha1",
                "k8s_k8s_keycloak_org_keycloak_realm_import_v2alpha1",
            ]
        );
    }

    #[test]
    fn test_unknown_type() {
        let provider = Provider::with_data(ProviderData::offline());

        let err = provider.resource("k8s_unknown_v1").err().unwrap();
        assert!(matches!(err, ProviderError::UnknownType(ref t) if t == "k8s_unknown_v1"));
        assert!(provider.data_source("k8s_unknown_v1").is_err());
    }

    #[test]
    fn test_client_offline_wins() {
        let data = ProviderData::offline();
        assert!(matches!(data.client("create"), Err(ProviderError::OfflineMode("create"))));

        let data = ProviderData::from_config(&Config::default(), None);
        assert!(matches!(data.client("read"), Err(ProviderError::Unconfigured)));
    }

    #[test]
    fn test_from_config_defaults() {
        let config = Config {
            field_manager: "ci".to_string(),
            force_conflicts: true,
            ..Default::default()
        };

        let data = ProviderData::from_config(&config, None);

        assert_eq!(data.field_manager, "ci");
        assert!(data.force_conflicts);
        assert!(!data.offline);
    }

    #[tokio::test]
    async fn test_configure_offline_needs_no_cluster() {
        let config = Config {
            offline: true,
            ..Default::default()
        };

        let provider = Provider::configure(&config).await.unwrap();
        let manifest = provider
            .data_source("k8s_kms_services_k8s_aws_alias_v1alpha1_manifest")
            .unwrap();

        let state = manifest
            .read(json!({
                "metadata": {"name": "a1", "namespace": "ns1"},
                "spec": {"name": "alias/billing"}
            }))
            .await
            .unwrap();
        assert!(state["yaml"].as_str().unwrap().contains("name: alias/billing"));
    }

    #[tokio::test]
    async fn test_resource_is_configured_with_provider_data() {
        let path = "/apis/kms.services.k8s.aws/v1alpha1/namespaces/ns1/keys/k1";
        let mock = MockService::new().on_patch(
            path,
            200,
            &object_json("kms.services.k8s.aws/v1alpha1", "Key", "ns1", "k1", json!({})),
        );
        let data = ProviderData {
            field_manager: "platform".to_string(),
            force_conflicts: true,
            ..ProviderData::for_client(mock.clone().into_client())
        };
        let provider = Provider::with_data(data);

        let state = provider
            .resource("k8s_kms_services_k8s_aws_key_v1alpha1")
            .unwrap()
            .create(json!({"metadata": {"name": "k1", "namespace": "ns1"}}))
            .await
            .unwrap();

        assert_eq!(state["field_manager"], "platform");
        assert_eq!(state["force_conflicts"], true);
        assert!(mock.requests()[0].query.clone().unwrap_or_default().contains("force=true"));
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data sources reading one existing object from the cluster.

use crate::error::{ProviderError, Result};
use crate::model::{
    api_resource, api_version, decode, from_state, kind, to_state, type_name, CrdKind,
    DataSourceModel, SpecOf,
};
use crate::provider::ProviderData;
use crate::schema::{data_source_schema, Schema};
use async_trait::async_trait;
use kube::core::object::HasSpec;
use kube::Resource;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Read-only component addressed by its type name
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Receive the provider data built at configure time
    fn configure(&mut self, data: Arc<ProviderData>);

    /// Validate `config` and produce the data source state
    async fn read(&self, config: Value) -> Result<Value>;
}

/// Data source reading a `K` by namespace and name
pub struct CrdDataSource<K> {
    data: Option<Arc<ProviderData>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CrdKind> CrdDataSource<K> {
    pub fn new() -> Self {
        Self {
            data: None,
            _kind: PhantomData,
        }
    }

    #[instrument(skip(self, model), fields(namespace = %model.metadata.namespace, name = %model.metadata.name))]
    pub async fn read_model(
        &self,
        mut model: DataSourceModel<SpecOf<K>>,
    ) -> Result<DataSourceModel<SpecOf<K>>> {
        let data = self.data.as_ref().ok_or(ProviderError::Unconfigured)?;
        let client = data.client("read")?;

        debug!("Reading {} data source", kind::<K>());
        let response = client
            .get(&api_resource::<K>(), &model.metadata.namespace, &model.metadata.name)
            .await?;
        let object: K = decode(response)?;

        model.id = Some(model.metadata.id());
        model.api_version = Some(api_version::<K>());
        model.kind = Some(kind::<K>());
        model.metadata.update_from(object.meta());
        model.spec = Some(object.spec().clone());
        Ok(model)
    }
}

impl<K: CrdKind> Default for CrdDataSource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CrdKind> DataSource for CrdDataSource<K> {
    fn type_name(&self) -> String {
        type_name::<K>()
    }

    fn schema(&self) -> Schema {
        data_source_schema::<K>()
    }

    fn configure(&mut self, data: Arc<ProviderData>) {
        self.data = Some(data);
    }

    async fn read(&self, config: Value) -> Result<Value> {
        self.schema().validate(&config).into_result()?;
        let model = self.read_model(from_state(config)?).await?;
        to_state(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::kms::{Grant, Key, KeySpec};
    use crate::model::Metadata;
    use crate::test_utils::{not_found_json, object_json, MockService};
    use serde_json::json;

    const KEY_PATH: &str = "/apis/kms.services.k8s.aws/v1alpha1/namespaces/ns1/keys/k1";

    fn configured(mock: MockService) -> CrdDataSource<Key> {
        let mut data_source = CrdDataSource::<Key>::new();
        data_source.configure(Arc::new(ProviderData::for_client(mock.into_client())));
        data_source
    }

    fn key_json() -> String {
        object_json(
            "kms.services.k8s.aws/v1alpha1",
            "Key",
            "ns1",
            "k1",
            json!({"description": "from cluster", "keyUsage": "ENCRYPT_DECRYPT"}),
        )
    }

    #[tokio::test]
    async fn test_read_projects_object_into_state() {
        let data_source = configured(MockService::new().on_get(KEY_PATH, 200, &key_json()));

        let state = data_source
            .read(json!({"metadata": {"name": "k1", "namespace": "ns1"}}))
            .await
            .unwrap();

        assert_eq!(state["id"], "ns1/k1");
        assert_eq!(state["api_version"], "kms.services.k8s.aws/v1alpha1");
        assert_eq!(state["kind"], "Key");
        assert_eq!(state["spec"]["description"], "from cluster");
        assert_eq!(state["spec"]["keyUsage"], "ENCRYPT_DECRYPT");
    }

    #[tokio::test]
    async fn test_read_model_is_typed() {
        let data_source = configured(MockService::new().on_get(KEY_PATH, 200, &key_json()));
        let model = DataSourceModel {
            id: None,
            api_version: None,
            kind: None,
            metadata: Metadata::new("ns1", "k1"),
            spec: None,
        };

        let model = data_source.read_model(model).await.unwrap();

        assert_eq!(
            model.spec,
            Some(KeySpec {
                description: Some("from cluster".to_string()),
                key_usage: Some("ENCRYPT_DECRYPT".to_string()),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn test_read_not_found_is_get_diagnostic() {
        let data_source =
            configured(MockService::new().on_get(KEY_PATH, 404, &not_found_json("keys", "k1")));

        let err = data_source
            .read(json!({"metadata": {"name": "k1", "namespace": "ns1"}}))
            .await
            .unwrap_err();

        assert_eq!(err.summary(), "Unable to GET resource");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_requires_namespace() {
        let mock = MockService::new();
        let data_source = configured(mock.clone());

        let err = data_source
            .read(json!({"metadata": {"name": "k1"}}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Invalid(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_read_offline_is_rejected() {
        let mut data_source = CrdDataSource::<Grant>::new();
        data_source.configure(Arc::new(ProviderData::offline()));

        let err = data_source
            .read(json!({"metadata": {"name": "g1", "namespace": "ns1"}}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::OfflineMode("read")));
    }

    #[tokio::test]
    async fn test_read_unconfigured() {
        let data_source = CrdDataSource::<Key>::new();

        let err = data_source
            .read(json!({"metadata": {"name": "k1", "namespace": "ns1"}}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Unconfigured));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(
            CrdDataSource::<Key>::new().type_name(),
            "k8s_kms_services_k8s_aws_key_v1alpha1"
        );
    }
}

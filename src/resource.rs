// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Managed resources: create, read, update, delete and import of custom
//! resource objects through server-side apply.

use crate::error::{ProviderError, Result};
use crate::model::{
    api_resource, api_version, decode, from_state, kind, parse_import_id, to_state, type_name,
    CrdKind, ManifestObject, Metadata, ResourceModel, SpecOf,
};
use crate::provider::ProviderData;
use crate::schema::{resource_schema, Schema};
use crate::wait::wait_until_ready;
use async_trait::async_trait;
use kube::core::object::HasSpec;
use kube::Resource as _;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Lifecycle component addressed by its type name
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    fn configure(&mut self, data: Arc<ProviderData>);

    /// Apply the planned object and return the new state
    async fn create(&self, plan: Value) -> Result<Value>;

    /// Refresh the state from the cluster
    async fn read(&self, state: Value) -> Result<Value>;

    /// Apply the planned object over an existing one
    async fn update(&self, plan: Value) -> Result<Value>;

    async fn delete(&self, state: Value) -> Result<()>;

    /// Build a minimal state from a `namespace/name` identifier
    async fn import_state(&self, id: &str) -> Result<Value>;
}

/// Resource managing objects of kind `K`
pub struct CrdResource<K> {
    data: Option<Arc<ProviderData>>,
    waitable: bool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CrdKind> CrdResource<K> {
    pub fn new() -> Self {
        Self {
            data: None,
            waitable: false,
            _kind: PhantomData,
        }
    }

    /// Same resource with a `wait_for` block in its schema
    pub fn waitable() -> Self {
        Self {
            waitable: true,
            ..Self::new()
        }
    }

    fn data(&self) -> Result<&ProviderData> {
        self.data.as_deref().ok_or(ProviderError::Unconfigured)
    }

    #[instrument(skip(self, model), fields(kind = %kind::<K>(), namespace = %model.metadata.namespace, name = %model.metadata.name))]
    pub async fn create_model(&self, mut model: ResourceModel<SpecOf<K>>) -> Result<ResourceModel<SpecOf<K>>> {
        // Offline and unconfigured checks come before any state change
        self.data()?.client("create")?;
        model.id = Some(model.metadata.id());
        self.apply(model, "create").await
    }

    #[instrument(skip(self, model), fields(kind = %kind::<K>(), namespace = %model.metadata.namespace, name = %model.metadata.name))]
    pub async fn update_model(&self, model: ResourceModel<SpecOf<K>>) -> Result<ResourceModel<SpecOf<K>>> {
        // name and namespace are immutable, a new identity is a new object
        let planned = model.metadata.id();
        match &model.id {
            Some(id) if *id != planned => Err(ProviderError::RequiresReplace {
                id: id.clone(),
                planned,
            }),
            _ => self.apply(model, "update").await,
        }
    }

    async fn apply(
        &self,
        mut model: ResourceModel<SpecOf<K>>,
        operation: &'static str,
    ) -> Result<ResourceModel<SpecOf<K>>> {
        let data = self.data()?;
        let client = data.client(operation)?;

        let wait_for = model
            .wait_for
            .clone()
            .filter(|w| self.waitable && !w.is_empty());
        if let Some(wait_for) = &wait_for {
            wait_for.timeout()?;
        }

        model.api_version = Some(api_version::<K>());
        model.kind = Some(kind::<K>());
        let field_manager = model
            .field_manager
            .clone()
            .unwrap_or_else(|| data.field_manager.clone());
        let force = model.force_conflicts.unwrap_or(data.force_conflicts);
        model.field_manager = Some(field_manager.clone());
        model.force_conflicts = Some(force);

        let body = serde_json::to_value(ManifestObject::new::<K>(&model.metadata, &model.spec))
            .map_err(ProviderError::Marshal)?;

        let ar = api_resource::<K>();
        let namespace = model.metadata.namespace.clone();
        let name = model.metadata.name.clone();
        let mut response = client
            .apply(&ar, &namespace, &name, &body, &field_manager, force)
            .await?;

        if let Some(wait_for) = &wait_for {
            debug!("Waiting for {} {}/{}", ar.kind, namespace, name);
            response = wait_until_ready(client, &ar, &namespace, &name, wait_for).await?;
        }

        let object: K = decode(response)?;
        model.metadata.update_from(object.meta());
        model.spec = object.spec().clone();
        info!("{} {} {}/{}", operation, ar.kind, namespace, name);
        Ok(model)
    }

    #[instrument(skip(self, model), fields(kind = %kind::<K>(), namespace = %model.metadata.namespace, name = %model.metadata.name))]
    pub async fn read_model(&self, mut model: ResourceModel<SpecOf<K>>) -> Result<ResourceModel<SpecOf<K>>> {
        let client = self.data()?.client("read")?;

        let response = client
            .get(&api_resource::<K>(), &model.metadata.namespace, &model.metadata.name)
            .await?;
        let object: K = decode(response)?;

        model.api_version = Some(api_version::<K>());
        model.kind = Some(kind::<K>());
        model.metadata.update_from(object.meta());
        model.spec = object.spec().clone();
        Ok(model)
    }

    #[instrument(skip(self, model), fields(kind = %kind::<K>(), namespace = %model.metadata.namespace, name = %model.metadata.name))]
    pub async fn delete_model(&self, model: ResourceModel<SpecOf<K>>) -> Result<()> {
        let client = self.data()?.client("delete")?;
        client
            .delete(&api_resource::<K>(), &model.metadata.namespace, &model.metadata.name)
            .await
    }

    pub fn import_model(&self, id: &str) -> Result<ResourceModel<SpecOf<K>>> {
        let (namespace, name) = parse_import_id(id)?;
        let mut model = ResourceModel::new(Metadata::new(namespace, name), Default::default());
        model.id = Some(id.to_string());
        Ok(model)
    }
}

impl<K: CrdKind> Default for CrdResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CrdKind> Resource for CrdResource<K> {
    fn type_name(&self) -> String {
        type_name::<K>()
    }

    fn schema(&self) -> Schema {
        resource_schema::<K>(self.waitable)
    }

    fn configure(&mut self, data: Arc<ProviderData>) {
        self.data = Some(data);
    }

    async fn create(&self, plan: Value) -> Result<Value> {
        self.schema().validate(&plan).into_result()?;
        let model = self.create_model(from_state(plan)?).await?;
        to_state(&model)
    }

    async fn read(&self, state: Value) -> Result<Value> {
        let model = self.read_model(from_state(state)?).await?;
        to_state(&model)
    }

    async fn update(&self, plan: Value) -> Result<Value> {
        self.schema().validate(&plan).into_result()?;
        let model = self.update_model(from_state(plan)?).await?;
        to_state(&model)
    }

    async fn delete(&self, state: Value) -> Result<()> {
        self.delete_model(from_state(state)?).await
    }

    async fn import_state(&self, id: &str) -> Result<Value> {
        to_state(&self.import_model(id)?)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest data sources: render a desired object to YAML without any
//! cluster access.

use crate::datasource::DataSource;
use crate::error::Result;
use crate::model::{from_state, manifest_type_name, to_state, CrdKind, ManifestModel, ManifestObject, SpecOf};
use crate::provider::ProviderData;
use crate::schema::{manifest_schema, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct CrdManifest<K> {
    _kind: PhantomData<fn() -> K>,
}

impl<K: CrdKind> CrdManifest<K> {
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }

    /// Stamp `id` and `yaml` onto the model
    pub fn render(&self, mut model: ManifestModel<SpecOf<K>>) -> Result<ManifestModel<SpecOf<K>>> {
        let object = ManifestObject::new::<K>(&model.metadata, &model.spec);
        model.yaml = Some(serde_yaml::to_string(&object)?);
        model.id = Some(model.metadata.id());
        Ok(model)
    }
}

impl<K: CrdKind> Default for CrdManifest<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CrdKind> DataSource for CrdManifest<K> {
    fn type_name(&self) -> String {
        manifest_type_name::<K>()
    }

    fn schema(&self) -> Schema {
        manifest_schema::<K>()
    }

    fn configure(&mut self, _data: Arc<ProviderData>) {}

    async fn read(&self, config: Value) -> Result<Value> {
        self.schema().validate(&config).into_result()?;
        let model = self.render(from_state(config)?)?;
        to_state(&model)
    }
}

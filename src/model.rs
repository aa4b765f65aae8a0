// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! State models shared by every custom resource kind.

use crate::constants::{MANIFEST_SUFFIX, PROVIDER_TYPE_NAME};
use crate::error::{ProviderError, Result};
use crate::wait::WaitFor;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::NamespaceResourceScope;
use kube::api::DynamicObject;
use kube::core::object::HasSpec;
use kube::discovery::ApiResource;
use kube::{CustomResourceExt, Resource};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A namespaced custom resource type that can be exposed by the provider.
///
/// Implemented for every type generated by `#[derive(CustomResource)]` with
/// `#[kube(namespaced)]` whose spec is plain serde data.
pub trait CrdKind:
    Clone
    + Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + CustomResourceExt
    + HasSpec<
        Spec: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
    >
    + DeserializeOwned
    + Serialize
    + Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> CrdKind for T where
    T: Clone
        + Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + CustomResourceExt
        + HasSpec<
            Spec: Clone
                      + Debug
                      + Default
                      + PartialEq
                      + Serialize
                      + DeserializeOwned
                      + Send
                      + Sync
                      + 'static,
        >
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync
        + 'static
{
}

/// Spec type of a kind
pub type SpecOf<K> = <K as HasSpec>::Spec;

pub fn api_version<K: CrdKind>() -> String {
    K::api_version(&()).into_owned()
}

pub fn kind<K: CrdKind>() -> String {
    K::kind(&()).into_owned()
}

pub fn api_resource<K: CrdKind>() -> ApiResource {
    ApiResource::erase::<K>(&())
}

/// Type name of the resource and data source for `K`, e.g.
/// `k8s_kms_services_k8s_aws_key_v1alpha1`.
pub fn type_name<K: CrdKind>() -> String {
    format!(
        "{}_{}_{}_{}",
        PROVIDER_TYPE_NAME,
        K::group(&()).replace(['.', '-'], "_"),
        snake_case(&K::kind(&())),
        K::version(&())
    )
}

pub fn manifest_type_name<K: CrdKind>() -> String {
    format!("{}{}", type_name::<K>(), MANIFEST_SUFFIX)
}

fn snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let chars: Vec<char> = value.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && !chars[i - 1].is_ascii_uppercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

/// Terraform resource id of a namespaced object
pub fn object_id(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Split an import identifier of the form `namespace/name`
pub fn parse_import_id(id: &str) -> Result<(String, String)> {
    match id.split('/').collect::<Vec<_>>().as_slice() {
        [namespace, name] if !namespace.is_empty() && !name.is_empty() => {
            Ok((namespace.to_string(), name.to_string()))
        }
        _ => Err(ProviderError::InvalidImportId(id.to_string())),
    }
}

/// Identity and user-owned metadata of an object
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Metadata {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> String {
        object_id(&self.namespace, &self.name)
    }

    pub fn to_object_meta(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: self.labels.clone(),
            annotations: self.annotations.clone(),
            ..Default::default()
        }
    }

    /// Take labels and annotations from what the cluster returned. Name and
    /// namespace stay as configured.
    pub fn update_from(&mut self, meta: &ObjectMeta) {
        self.labels = meta.labels.clone().filter(|l| !l.is_empty());
        self.annotations = meta.annotations.clone().filter(|a| !a.is_empty());
    }
}

/// Object as sent to and rendered for the API server
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ManifestObject<'a, S> {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: &'a S,
}

impl<'a, S: Serialize> ManifestObject<'a, S> {
    pub fn new<K>(metadata: &Metadata, spec: &'a S) -> Self
    where
        K: CrdKind + HasSpec<Spec = S>,
    {
        Self {
            api_version: api_version::<K>(),
            kind: kind::<K>(),
            metadata: metadata.to_object_meta(),
            spec,
        }
    }
}

/// Decode an object returned by the API server into its typed form
pub fn decode<K: CrdKind>(obj: DynamicObject) -> Result<K> {
    obj.try_parse::<K>()
        .map_err(|e| ProviderError::Unmarshal(format!("{} response: {}", kind::<K>(), e)))
}

/// State of a managed resource
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResourceModel<S> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_conflicts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<WaitFor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: S,
}

impl<S> ResourceModel<S> {
    pub fn new(metadata: Metadata, spec: S) -> Self {
        Self {
            id: None,
            field_manager: None,
            force_conflicts: None,
            wait_for: None,
            api_version: None,
            kind: None,
            metadata,
            spec,
        }
    }
}

/// State of a data source read from the cluster
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataSourceModel<S> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

/// State of a manifest data source
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ManifestModel<S> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml: Option<String>,
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: S,
}

/// Deserialize a JSON state or config value into a typed model
pub fn from_state<M: DeserializeOwned>(value: serde_json::Value) -> Result<M> {
    serde_json::from_value(value).map_err(|e| ProviderError::Unmarshal(e.to_string()))
}

/// Serialize a typed model back into a JSON state value
pub fn to_state<M: Serialize>(model: &M) -> Result<serde_json::Value> {
    serde_json::to_value(model).map_err(ProviderError::Marshal)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! AWS Controllers for Kubernetes, KMS service (`kms.services.k8s.aws/v1alpha1`)

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A KMS key
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "kms.services.k8s.aws", version = "v1alpha1", kind = "Key", plural = "keys")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_policy_lockout_safety_check: Option<bool>,
    /// Creates the KMS key in the specified custom key store
    #[serde(rename = "customKeyStoreID", skip_serializing_if = "Option::is_none")]
    pub custom_key_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_key_rotation: Option<bool>,
    /// SYMMETRIC_DEFAULT, RSA_2048, ECC_NIST_P256, HMAC_256, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_spec: Option<String>,
    /// ENCRYPT_DECRYPT, SIGN_VERIFY or GENERATE_VERIFY_MAC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_region: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Key policy as a JSON document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_value: Option<String>,
}

/// A grant on a KMS key
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "kms.services.k8s.aws", version = "v1alpha1", kind = "Grant", plural = "grants")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct GrantSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<GrantConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_tokens: Option<Vec<String>>,
    /// Principal that is given permission to perform the operations
    pub grantee_principal: String,
    #[serde(rename = "keyID", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Reference to a `Key` object in the same namespace, used instead of `keyID`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<ResourceReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub operations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retiring_principal: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_context_equals: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_context_subset: Option<BTreeMap<String, String>>,
}

/// An alias for a KMS key
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "kms.services.k8s.aws", version = "v1alpha1", kind = "Alias", plural = "aliases")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct AliasSpec {
    /// Alias name, must begin with `alias/`
    pub name: String,
    #[serde(rename = "targetKeyID", skip_serializing_if = "Option::is_none")]
    pub target_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_key_ref: Option<ResourceReference>,
}

/// Cross reference to another ACK object, `{from: {name}}`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct ResourceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ResourceReferenceFrom>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct ResourceReferenceFrom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

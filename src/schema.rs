// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Attribute schemas of resources and data sources, and config validation
//! against them.
//!
//! The `spec` attribute of every kind is derived from the OpenAPI v3 schema of
//! its generated CRD, so the schema always matches the Rust types.

use crate::error::{Diagnostic, Diagnostics};
use crate::model::CrdKind;
use crate::validators::Validator;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    JSONSchemaProps, JSONSchemaPropsOrArray, JSONSchemaPropsOrBool,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    Int64,
    Float64,
    /// Any JSON value, for preserve-unknown-fields and int-or-string
    Dynamic,
    List {
        element: Box<AttributeKind>,
    },
    Map {
        element: Box<AttributeKind>,
    },
    Object {
        attributes: BTreeMap<String, Attribute>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(kind: AttributeKind, required: bool, optional: bool, computed: bool) -> Self {
        Self {
            kind,
            description: String::new(),
            required,
            optional,
            computed,
            requires_replace: false,
            validators: Vec::new(),
        }
    }

    pub fn required(kind: AttributeKind) -> Self {
        Self::new(kind, true, false, false)
    }

    pub fn optional(kind: AttributeKind) -> Self {
        Self::new(kind, false, true, false)
    }

    pub fn computed(kind: AttributeKind) -> Self {
        Self::new(kind, false, false, true)
    }

    /// Optional in config, filled in by the provider when absent
    pub fn optional_computed(kind: AttributeKind) -> Self {
        Self::new(kind, false, true, true)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Schema of one resource or data source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

fn string_map() -> AttributeKind {
    AttributeKind::Map {
        element: Box::new(AttributeKind::String),
    }
}

/// Which component a schema is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Resource,
    DataSource,
    Manifest,
}

fn metadata_attribute(mode: Mode) -> Attribute {
    let name = Attribute::required(AttributeKind::String)
        .describe("Unique name of the object within its namespace.")
        .requires_replace()
        .validate_with(Validator::ResourceName);
    let namespace = Attribute::required(AttributeKind::String)
        .describe("Namespace of the object.")
        .requires_replace()
        .validate_with(Validator::Namespace);

    let (labels, annotations) = match mode {
        Mode::DataSource => (
            Attribute::computed(string_map()),
            Attribute::computed(string_map()),
        ),
        Mode::Resource | Mode::Manifest => (
            Attribute::optional(string_map()).validate_with(Validator::Labels),
            Attribute::optional(string_map()).validate_with(Validator::Annotations),
        ),
    };

    let attributes = BTreeMap::from([
        ("name".to_string(), name),
        ("namespace".to_string(), namespace),
        (
            "labels".to_string(),
            labels.describe("Map of string keys and values to organize and categorize objects."),
        ),
        (
            "annotations".to_string(),
            annotations.describe("Unstructured key value map stored with the object."),
        ),
    ]);

    Attribute::required(AttributeKind::Object { attributes }).describe("Data that helps uniquely identify the object.")
}

/// OpenAPI schema of the `spec` field of `K`'s served version
fn spec_props<K: CrdKind>() -> Option<JSONSchemaProps> {
    let version = K::version(&());
    K::crd()
        .spec
        .versions
        .into_iter()
        .find(|v| v.name == version)?
        .schema?
        .open_api_v3_schema?
        .properties?
        .remove("spec")
}

fn convert_kind(props: &JSONSchemaProps, computed_only: bool) -> AttributeKind {
    if props.x_kubernetes_int_or_string == Some(true) {
        return AttributeKind::Dynamic;
    }

    let object = |properties: &BTreeMap<String, JSONSchemaProps>| AttributeKind::Object {
        attributes: convert_properties(properties, props.required.as_deref(), computed_only),
    };

    match props.type_.as_deref() {
        Some("string") => AttributeKind::String,
        Some("boolean") => AttributeKind::Bool,
        Some("integer") => AttributeKind::Int64,
        Some("number") => AttributeKind::Float64,
        Some("array") => {
            let element = match &props.items {
                Some(JSONSchemaPropsOrArray::Schema(item)) => convert_kind(item, computed_only),
                Some(JSONSchemaPropsOrArray::Schemas(items)) => items
                    .first()
                    .map_or(AttributeKind::Dynamic, |item| convert_kind(item, computed_only)),
                None => AttributeKind::Dynamic,
            };
            AttributeKind::List {
                element: Box::new(element),
            }
        }
        _ => match (&props.properties, &props.additional_properties) {
            (Some(properties), _) if !properties.is_empty() => object(properties),
            (_, Some(JSONSchemaPropsOrBool::Schema(value))) => AttributeKind::Map {
                element: Box::new(convert_kind(value, computed_only)),
            },
            (_, Some(JSONSchemaPropsOrBool::Bool(true))) => AttributeKind::Map {
                element: Box::new(AttributeKind::Dynamic),
            },
            _ => AttributeKind::Dynamic,
        },
    }
}

fn convert_properties(
    properties: &BTreeMap<String, JSONSchemaProps>,
    required: Option<&[String]>,
    computed_only: bool,
) -> BTreeMap<String, Attribute> {
    properties
        .iter()
        .map(|(name, props)| {
            let kind = convert_kind(props, computed_only);
            let is_required = required.is_some_and(|r| r.iter().any(|n| n == name));
            let attribute = if computed_only {
                Attribute::computed(kind)
            } else if is_required {
                Attribute::required(kind)
            } else {
                Attribute::optional(kind)
            };
            (
                name.clone(),
                attribute.describe(props.description.clone().unwrap_or_default()),
            )
        })
        .collect()
}

fn spec_attribute<K: CrdKind>(computed_only: bool) -> Attribute {
    let Some(props) = spec_props::<K>() else {
        return Attribute::optional(AttributeKind::Dynamic);
    };

    let kind = convert_kind(&props, computed_only);
    let attribute = if computed_only {
        Attribute::computed(kind)
    } else if props.required.as_ref().is_some_and(|r| !r.is_empty()) {
        Attribute::required(kind)
    } else {
        Attribute::optional(kind)
    };
    attribute.describe(props.description.unwrap_or_default())
}

fn identity_attributes() -> BTreeMap<String, Attribute> {
    BTreeMap::from([
        (
            "id".to_string(),
            Attribute::computed(AttributeKind::String)
                .describe("Contains the value `metadata.namespace/metadata.name`."),
        ),
        (
            "api_version".to_string(),
            Attribute::computed(AttributeKind::String)
                .describe("The API group of the requested resource."),
        ),
        (
            "kind".to_string(),
            Attribute::computed(AttributeKind::String).describe("The type of the requested resource."),
        ),
    ])
}

fn wait_for_attribute() -> Attribute {
    let attributes = BTreeMap::from([
        (
            "jsonpath".to_string(),
            Attribute::optional(string_map())
                .describe("JSONPath expressions mapped to the value they must have."),
        ),
        (
            "conditions".to_string(),
            Attribute::optional(string_map())
                .describe("Condition types mapped to the status they must have."),
        ),
        (
            "timeout".to_string(),
            Attribute::optional(AttributeKind::String)
                .describe("How long to wait, e.g. '30s' or '5m'. Defaults to 30s.")
                .validate_with(Validator::Duration),
        ),
    ]);
    Attribute::optional(AttributeKind::Object { attributes })
        .describe("Wait until the applied object reaches the given state.")
}

pub fn resource_schema<K: CrdKind>(waitable: bool) -> Schema {
    let mut attributes = identity_attributes();
    attributes.insert(
        "field_manager".to_string(),
        Attribute::optional_computed(AttributeKind::String)
            .describe("The name of the manager used to track field ownership."),
    );
    attributes.insert(
        "force_conflicts".to_string(),
        Attribute::optional_computed(AttributeKind::Bool)
            .describe("If true, server-side apply will force the changes against conflicts."),
    );
    if waitable {
        attributes.insert("wait_for".to_string(), wait_for_attribute());
    }
    attributes.insert("metadata".to_string(), metadata_attribute(Mode::Resource));
    attributes.insert("spec".to_string(), spec_attribute::<K>(false));

    Schema {
        description: format!("Manages a {} in the cluster.", K::kind(&())),
        attributes,
    }
}

pub fn data_source_schema<K: CrdKind>() -> Schema {
    let mut attributes = identity_attributes();
    attributes.insert("metadata".to_string(), metadata_attribute(Mode::DataSource));
    attributes.insert("spec".to_string(), spec_attribute::<K>(true));

    Schema {
        description: format!("Reads an existing {} from the cluster.", K::kind(&())),
        attributes,
    }
}

pub fn manifest_schema<K: CrdKind>() -> Schema {
    let mut attributes = BTreeMap::from([
        (
            "id".to_string(),
            Attribute::computed(AttributeKind::String)
                .describe("Contains the value `metadata.namespace/metadata.name`."),
        ),
        (
            "yaml".to_string(),
            Attribute::computed(AttributeKind::String).describe("The generated manifest in YAML format."),
        ),
    ]);
    attributes.insert("metadata".to_string(), metadata_attribute(Mode::Manifest));
    attributes.insert("spec".to_string(), spec_attribute::<K>(false));

    Schema {
        description: format!("Creates a YAML manifest of a {} without touching the cluster.", K::kind(&())),
        attributes,
    }
}

impl Schema {
    /// Check a configuration value against this schema
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match config {
            Value::Object(map) => validate_object(&self.attributes, map, "", &mut diagnostics),
            other => diagnostics.push(Diagnostic::error(
                "Invalid configuration",
                format!("expected an object, got {}", type_label(other)),
            )),
        }
        diagnostics
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn validate_object(
    attributes: &BTreeMap<String, Attribute>,
    values: &Map<String, Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    for key in values.keys() {
        if !attributes.contains_key(key) {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named '{}' is not expected here.", key),
                )
                .at(join(path, key)),
            );
        }
    }

    for (name, attribute) in attributes {
        let attribute_path = join(path, name);
        match values.get(name) {
            None | Some(Value::Null) => {
                if attribute.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument '{}' is required, but no definition was found.", name),
                        )
                        .at(attribute_path),
                    );
                }
            }
            Some(value) => {
                validate_value(&attribute.kind, value, &attribute_path, diagnostics);
                for validator in &attribute.validators {
                    for message in validator.check(value) {
                        diagnostics.push(
                            Diagnostic::error("Invalid attribute value", message).at(attribute_path.clone()),
                        );
                    }
                }
            }
        }
    }
}

fn validate_value(kind: &AttributeKind, value: &Value, path: &str, diagnostics: &mut Diagnostics) {
    let mismatch = |expected: &str, diagnostics: &mut Diagnostics| {
        diagnostics.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!("expected {}, got {}", expected, type_label(value)),
            )
            .at(path.to_string()),
        );
    };

    match (kind, value) {
        (AttributeKind::Dynamic, _) => {}
        (AttributeKind::String, Value::String(_)) => {}
        (AttributeKind::Bool, Value::Bool(_)) => {}
        (AttributeKind::Int64, Value::Number(n)) if n.is_i64() || n.is_u64() => {}
        (AttributeKind::Float64, Value::Number(_)) => {}
        (AttributeKind::List { element }, Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_value(element, item, &format!("{}[{}]", path, i), diagnostics);
            }
        }
        (AttributeKind::Map { element }, Value::Object(entries)) => {
            for (key, item) in entries {
                validate_value(element, item, &format!("{}[\"{}\"]", path, key), diagnostics);
            }
        }
        (AttributeKind::Object { attributes }, Value::Object(values)) => {
            validate_object(attributes, values, path, diagnostics);
        }
        (AttributeKind::String, _) => mismatch("string", diagnostics),
        (AttributeKind::Bool, _) => mismatch("bool", diagnostics),
        (AttributeKind::Int64, _) => mismatch("integer", diagnostics),
        (AttributeKind::Float64, _) => mismatch("number", diagnostics),
        (AttributeKind::List { .. }, _) => mismatch("list", diagnostics),
        (AttributeKind::Map { .. }, _) => mismatch("map", diagnostics),
        (AttributeKind::Object { .. }, _) => mismatch("object", diagnostics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::keycloak::KeycloakRealmImport;
    use crate::crds::kms::{Alias, Grant, Key};
    use serde_json::json;

    fn object_attributes(attribute: &Attribute) -> &BTreeMap<String, Attribute> {
        match &attribute.kind {
            AttributeKind::Object { attributes } => attributes,
            other => panic!("expected object, got {:?}", other),
        }
    }

    fn paths(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics.iter().filter_map(|d| d.path.clone()).collect()
    }

    #[test]
    fn test_resource_schema_top_level() {
        let schema = resource_schema::<Key>(true);
        let names: Vec<&str> = schema.attributes.keys().map(String::as_str).collect();

        assert_eq!(
            names,
            vec![
                "api_version",
                "field_manager",
                "force_conflicts",
                "id",
                "kind",
                "metadata",
                "spec",
                "wait_for"
            ]
        );
        assert!(schema.attributes["id"].computed);
        assert!(schema.attributes["metadata"].required);
    }

    #[test]
    fn test_wait_for_only_when_waitable() {
        assert!(!resource_schema::<Grant>(false).attributes.contains_key("wait_for"));
    }

    #[test]
    fn test_metadata_identity_requires_replace() {
        let schema = resource_schema::<Key>(false);
        let metadata = object_attributes(&schema.attributes["metadata"]);

        assert!(metadata["name"].required && metadata["name"].requires_replace);
        assert!(metadata["namespace"].required && metadata["namespace"].requires_replace);
        assert!(metadata["labels"].optional);
        assert_eq!(metadata["namespace"].validators, vec![Validator::Namespace]);
    }

    #[test]
    fn test_spec_from_crd_schema() {
        let schema = resource_schema::<Key>(false);
        let spec = object_attributes(&schema.attributes["spec"]);

        assert!(schema.attributes["spec"].optional);
        assert_eq!(spec["description"].kind, AttributeKind::String);
        assert_eq!(spec["enableKeyRotation"].kind, AttributeKind::Bool);
        assert!(spec.contains_key("customKeyStoreID"));
        match &spec["tags"].kind {
            AttributeKind::List { element } => match element.as_ref() {
                AttributeKind::Object { attributes } => {
                    assert!(attributes.contains_key("tagKey"));
                    assert!(attributes["tagKey"].optional);
                }
                other => panic!("expected object element, got {:?}", other),
            },
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_required_spec_fields() {
        let schema = resource_schema::<Grant>(false);
        let spec = object_attributes(&schema.attributes["spec"]);

        assert!(schema.attributes["spec"].required);
        assert!(spec["granteePrincipal"].required);
        assert!(spec["operations"].required);
        assert!(spec["keyID"].optional);

        let constraints = object_attributes(&spec["constraints"]);
        assert_eq!(
            constraints["encryptionContextEquals"].kind,
            AttributeKind::Map {
                element: Box::new(AttributeKind::String)
            }
        );
    }

    #[test]
    fn test_nested_maps_and_integers() {
        let schema = resource_schema::<KeycloakRealmImport>(true);
        let spec = object_attributes(&schema.attributes["spec"]);
        let realm = object_attributes(&spec["realm"]);

        assert!(spec["keycloakCRName"].required);
        assert_eq!(realm["accessTokenLifespan"].kind, AttributeKind::Int64);
        assert!(matches!(spec["placeholders"].kind, AttributeKind::Map { .. }));
    }

    #[test]
    fn test_data_source_spec_is_computed() {
        let schema = data_source_schema::<Grant>();
        let spec = object_attributes(&schema.attributes["spec"]);
        let metadata = object_attributes(&schema.attributes["metadata"]);

        assert!(schema.attributes["spec"].computed);
        assert!(spec.values().all(|a| a.computed && !a.required));
        assert!(metadata["labels"].computed);
        assert!(metadata["name"].required);
    }

    #[test]
    fn test_manifest_schema_has_yaml() {
        let schema = manifest_schema::<Alias>();
        assert!(schema.attributes["yaml"].computed);
        assert!(!schema.attributes.contains_key("field_manager"));
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        let schema = resource_schema::<Key>(true);
        let config = json!({
            "metadata": {"name": "k1", "namespace": "ns1", "labels": {"app": "kms"}},
            "spec": {"description": "test", "tags": [{"tagKey": "team", "tagValue": "x"}]},
            "wait_for": {"jsonpath": {"status.ackResourceMetadata.ownerAccountID": "123"}}
        });

        let diagnostics = schema.validate(&config);
        assert!(diagnostics.is_empty(), "{}", diagnostics);
    }

    #[test]
    fn test_validate_rejects_bad_wait_timeout() {
        let schema = resource_schema::<Key>(true);
        let config = json!({
            "metadata": {"name": "k1", "namespace": "ns1"},
            "wait_for": {"jsonpath": {"status.keyState": "Enabled"}, "timeout": "banana"}
        });

        let diagnostics = schema.validate(&config);
        assert_eq!(paths(&diagnostics), vec!["wait_for.timeout"]);
    }

    #[test]
    fn test_validate_reports_missing_required() {
        let schema = resource_schema::<Grant>(false);
        let config = json!({
            "metadata": {"name": "g1"},
            "spec": {"operations": ["Encrypt"]}
        });

        let diagnostics = schema.validate(&config);
        assert_eq!(
            paths(&diagnostics),
            vec!["metadata.namespace", "spec.granteePrincipal"]
        );
    }

    #[test]
    fn test_validate_reports_type_mismatch_with_path() {
        let schema = resource_schema::<Key>(false);
        let config = json!({
            "metadata": {"name": "k1", "namespace": "ns1"},
            "spec": {"enableKeyRotation": "yes", "tags": [{"tagKey": 1}]}
        });

        let diagnostics = schema.validate(&config);
        assert_eq!(
            paths(&diagnostics),
            vec!["spec.enableKeyRotation", "spec.tags[0].tagKey"]
        );
        assert!(diagnostics
            .iter()
            .all(|d| d.summary == "Incorrect attribute value type"));
    }

    #[test]
    fn test_validate_reports_unsupported_argument() {
        let schema = resource_schema::<Key>(false);
        let config = json!({
            "metadata": {"name": "k1", "namespace": "ns1"},
            "spec": {"keyRotation": true}
        });

        let diagnostics = schema.validate(&config);
        assert_eq!(paths(&diagnostics), vec!["spec.keyRotation"]);
        assert_eq!(diagnostics.iter().next().unwrap().summary, "Unsupported argument");
    }

    #[test]
    fn test_validate_runs_metadata_validators() {
        let schema = manifest_schema::<Key>();
        let config = json!({"metadata": {"name": "Bad_Name", "namespace": "ns1"}});

        let diagnostics = schema.validate(&config);
        assert_eq!(paths(&diagnostics), vec!["metadata.name"]);
        assert_eq!(diagnostics.iter().next().unwrap().summary, "Invalid attribute value");
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let diagnostics = manifest_schema::<Key>().validate(&json!("nope"));
        assert!(!diagnostics.is_empty());
    }
}

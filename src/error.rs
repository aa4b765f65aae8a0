// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Provider errors and the diagnostics they surface as.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unable to GET resource {kind} {namespace}/{name}: {source}")]
    GetNamespacedResource {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Unable to PATCH resource {kind} {namespace}/{name}: {source}")]
    PatchResource {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Unable to DELETE resource {kind} {namespace}/{name}: {source}")]
    DeleteResource {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Unable to marshal resource: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("Unable to unmarshal resource: {0}")]
    Unmarshal(String),

    #[error("Unable to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Expected import identifier with format 'namespace/name', got '{0}'")]
    InvalidImportId(String),

    #[error("Cannot {0} resources while the provider is in offline mode")]
    OfflineMode(&'static str),

    #[error("Provider has not been configured with a Kubernetes client")]
    Unconfigured,

    #[error("Invalid configuration: {0}")]
    Invalid(Diagnostics),

    #[error("Timed out after {timeout} waiting for {kind} {namespace}/{name}")]
    WaitTimeout {
        kind: String,
        namespace: String,
        name: String,
        timeout: String,
    },

    #[error("Invalid wait_for timeout '{value}': {message}")]
    InvalidTimeout { value: String, message: String },

    #[error("Failed to build Kubernetes client: {0}")]
    KubeconfigError(String),

    #[error("Changing the identity of '{id}' to '{planned}' requires replacing the object")]
    RequiresReplace { id: String, planned: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// A user-facing problem report, shaped like a Terraform diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
    /// Attribute path the diagnostic refers to, e.g. `spec.tags[0].tagKey`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({}): {}", self.summary, path, self.detail),
            None => write!(f, "{}: {}", self.summary, self.detail),
        }
    }
}

/// Ordered collection of diagnostics gathered by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Fail with `Invalid` when anything was collected
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Invalid(self))
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl ProviderError {
    /// Short summary line used for the diagnostic of this error kind.
    pub fn summary(&self) -> &'static str {
        match self {
            ProviderError::GetNamespacedResource { .. } => "Unable to GET resource",
            ProviderError::PatchResource { .. } => "Unable to PATCH resource",
            ProviderError::DeleteResource { .. } => "Unable to DELETE resource",
            ProviderError::Marshal(_) => "Unable to marshal resource",
            ProviderError::Unmarshal(_) => "Unable to unmarshal resource",
            ProviderError::Yaml(_) => "Unable to render YAML",
            ProviderError::InvalidImportId(_) => "Unexpected Import Identifier",
            ProviderError::OfflineMode(_) => "Provider in offline mode",
            ProviderError::Unconfigured => "Unconfigured provider",
            ProviderError::Invalid(_) => "Invalid configuration",
            ProviderError::WaitTimeout { .. } => "Timed out waiting",
            ProviderError::InvalidTimeout { .. } => "Invalid configuration",
            ProviderError::KubeconfigError(_) => "Unconfigured provider",
            ProviderError::RequiresReplace { .. } => "Resource requires replacement",
            ProviderError::UnknownType(_) => "Unknown type",
        }
    }

    /// Diagnostics describing this error. Validation failures expand to one
    /// entry per problem.
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            ProviderError::Invalid(diagnostics) => diagnostics.clone(),
            other => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(Diagnostic::error(other.summary(), other.to_string()));
                diagnostics
            }
        }
    }

    /// Whether the API server answered with 404 Not Found.
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::GetNamespacedResource { source, .. }
            | ProviderError::PatchResource { source, .. }
            | ProviderError::DeleteResource { source, .. } => {
                matches!(source, kube::Error::Api(err) if err.code == 404)
            }
            _ => false,
        }
    }
}

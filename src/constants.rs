// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Provider type name, used as prefix for every resource and data source
pub const PROVIDER_TYPE_NAME: &str = "k8s";

/// Suffix appended to data sources that only render YAML
pub const MANIFEST_SUFFIX: &str = "_manifest";

/// Field manager used for server-side apply when none is configured
pub const DEFAULT_FIELD_MANAGER: &str = "terraform-provider-k8s";

/// Environment variables read by the provider configuration
pub mod env {
    pub const KUBECONFIG: &str = "KUBECONFIG";
    pub const CONTEXT: &str = "K8S_CONTEXT";
    pub const FIELD_MANAGER: &str = "K8S_FIELD_MANAGER";
    pub const FORCE_CONFLICTS: &str = "K8S_FORCE_CONFLICTS";
    pub const OFFLINE: &str = "K8S_OFFLINE";
}

/// Polling configuration for `wait_for`
pub mod wait {
    /// Initial polling interval in seconds
    pub const POLL_INTERVAL_SECS: u64 = 1;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 10;
    /// Timeout used when `wait_for.timeout` is not set
    pub const DEFAULT_TIMEOUT: &str = "30s";
}

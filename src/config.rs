// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as vars, DEFAULT_FIELD_MANAGER};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Provider configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Explicit kubeconfig file, otherwise the client config is inferred
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    /// Default field manager for server-side apply
    pub field_manager: String,
    /// Default for resources that do not set `force_conflicts`
    pub force_conflicts: bool,
    /// Render manifests only, refuse every call to the cluster
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            offline: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let field_manager =
            non_empty(vars::FIELD_MANAGER).unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_string());
        let force_conflicts = parse_flag(vars::FORCE_CONFLICTS, non_empty(vars::FORCE_CONFLICTS))?;
        let offline = parse_flag(vars::OFFLINE, non_empty(vars::OFFLINE))?;

        Ok(Config {
            kubeconfig: non_empty(vars::KUBECONFIG).map(PathBuf::from),
            context: non_empty(vars::CONTEXT),
            field_manager,
            force_conflicts,
            offline,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be 'true' or 'false', got '{}'", key, v)),
        None => Ok(false),
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from the provider configuration

use crate::config::Config;
use crate::error::{ProviderError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use tracing::{debug, info, instrument};

/// Create a Kubernetes client for the configured cluster
#[instrument(skip(config), fields(context = ?config.context))]
pub async fn create_client(config: &Config) -> Result<Client> {
    let client_config = match (&config.kubeconfig, &config.context) {
        (Some(path), context) => {
            info!("Loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                ProviderError::KubeconfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            KConfig::from_custom_kubeconfig(kubeconfig, &kube_config_options(context))
                .await
                .map_err(|e| {
                    ProviderError::KubeconfigError(format!("Failed to create config: {}", e))
                })?
        }
        (None, Some(context)) => {
            debug!("Using kubeconfig context {}", context);
            KConfig::from_kubeconfig(&kube_config_options(&Some(context.clone())))
                .await
                .map_err(|e| {
                    ProviderError::KubeconfigError(format!("Failed to create config: {}", e))
                })?
        }
        (None, None) => KConfig::infer().await.map_err(|e| {
            ProviderError::KubeconfigError(format!("Failed to infer config: {}", e))
        })?,
    };

    Client::try_from(client_config)
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to create client: {}", e)))
}

fn kube_config_options(context: &Option<String>) -> KubeConfigOptions {
    KubeConfigOptions {
        context: context.clone(),
        ..Default::default()
    }
}

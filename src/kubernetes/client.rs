// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from kubeconfig files, contexts, or the in-cluster environment

use crate::error::{Error, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config as KConfig,
};
use std::path::Path;
use tracing::{debug, instrument};

/// Create a Kubernetes client.
///
/// With an explicit kubeconfig path the file is parsed directly. Otherwise the
/// usual lookup applies (`KUBECONFIG`, `~/.kube/config`, in-cluster service account),
/// and a named context forces the kubeconfig route.
#[instrument(skip_all, fields(kubeconfig = ?kubeconfig, context = ?context))]
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
            })?;
            config_from_kubeconfig_str(&raw, &options).await?
        }
        None if context.is_some() => KConfig::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::Kubeconfig(format!("Failed to load context: {}", e)))?,
        None => KConfig::infer()
            .await
            .map_err(|e| Error::Kubeconfig(format!("Failed to infer config: {}", e)))?,
    };

    debug!("Using cluster {}", config.cluster_url);

    Client::try_from(config)
        .map_err(|e| Error::Kubeconfig(format!("Failed to create client: {}", e)))
}

/// Build a client config from kubeconfig yaml
async fn config_from_kubeconfig_str(kubeconfig: &str, options: &KubeConfigOptions) -> Result<KConfig> {
    let parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| Error::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    KConfig::from_custom_kubeconfig(parsed, options)
        .await
        .map_err(|e| Error::Kubeconfig(format!("Failed to create config: {}", e)))
}

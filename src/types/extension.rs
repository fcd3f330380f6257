// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::condition::{Condition, HasConditions};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "olm.operatorframework.io", version = "v1", kind = "ClusterExtension")]
#[kube(status = "ClusterExtensionStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionSpec {
    /// Namespace the extension's content is installed into
    pub namespace: String,
    pub service_account: ServiceAccountReference,
    pub source: SourceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<ClusterExtensionInstallConfig>,
}

/// Install-time behaviour of the extension controller
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionInstallConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preflight: Option<PreflightConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreflightConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crd_upgrade_safety: Option<CrdUpgradeSafetyPreflightConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct CrdUpgradeSafetyPreflightConfig {
    /// `Strict` or `None`
    pub enforcement: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ServiceAccountReference {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogFilter>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_constraint_policy: Option<UpgradeConstraintPolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct LabelSelectorRequirement {
    pub key: String,
    /// `In`, `NotIn`, `Exists` or `DoesNotExist`
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl LabelSelector {
    /// `None` for an empty label set so the selector is left out of the apply.
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Option<Self> {
        if labels.is_empty() {
            None
        } else {
            Some(LabelSelector {
                match_labels: Some(labels.clone()),
                match_expressions: None,
            })
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum UpgradeConstraintPolicy {
    CatalogProvided,
    SelfCertified,
}

impl std::str::FromStr for UpgradeConstraintPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CatalogProvided" => Ok(UpgradeConstraintPolicy::CatalogProvided),
            "SelfCertified" => Ok(UpgradeConstraintPolicy::SelfCertified),
            other => Err(format!(
                "unknown upgrade constraint policy {:?}, expected CatalogProvided or SelfCertified",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct InstallStatus {
    pub bundle: BundleMetadata,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct BundleMetadata {
    pub name: String,
    pub version: String,
}

impl HasConditions for ClusterExtension {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_deref())
            .unwrap_or_default()
    }
}

impl ClusterExtension {
    pub fn catalog_filter(&self) -> Option<&CatalogFilter> {
        self.spec.source.catalog.as_ref()
    }

    /// The bundle currently installed, if the controller reported one
    pub fn installed_bundle(&self) -> Option<&BundleMetadata> {
        self.status
            .as_ref()
            .and_then(|s| s.install.as_ref())
            .map(|i| &i.bundle)
    }
}

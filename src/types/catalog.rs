// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::condition::{Condition, HasConditions};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "olm.operatorframework.io", version = "v1", kind = "ClusterCatalog")]
#[kube(status = "ClusterCatalogStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterCatalogSpec {
    pub source: CatalogSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_mode: Option<AvailabilityMode>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct CatalogSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_minutes: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum AvailabilityMode {
    Available,
    Unavailable,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCatalogStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_source: Option<ResolvedCatalogSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<CatalogUrls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_unpacked: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ResolvedCatalogSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ResolvedImageSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ResolvedImageSource {
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct CatalogUrls {
    pub base: String,
}

impl HasConditions for ClusterCatalog {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_deref())
            .unwrap_or_default()
    }
}

impl ClusterCatalog {
    /// Image reference the catalog was created from
    pub fn image_ref(&self) -> Option<&str> {
        self.spec
            .source
            .image
            .as_ref()
            .map(|i| i.reference.as_str())
    }

    /// Whether the catalog is expected to serve content
    pub fn is_available(&self) -> bool {
        self.spec.availability_mode != Some(AvailabilityMode::Unavailable)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use tracing::{info, instrument};

use super::fetch;
use super::operator_install::observed;
use crate::config::Config;
use crate::constants::conditions;
use crate::error::{Error, Result};
use crate::kubernetes::{Getter, Patcher};
use crate::lifecycle::{apply_object, wait_until, OpContext};
use crate::types::extension::{CatalogFilter, LabelSelector, UpgradeConstraintPolicy};
use crate::types::{ClusterExtension, ClusterExtensionSpec, ConditionStatus};

/// Change the bundle resolution settings of an installed operator.
#[derive(Debug, Clone, Default)]
pub struct OperatorUpdate {
    pub package: String,
    pub version: Option<String>,
    pub channels: Option<Vec<String>>,
    pub selector: Option<BTreeMap<String, String>>,
    pub upgrade_constraint_policy: Option<UpgradeConstraintPolicy>,
    /// Keep existing values for settings left unset; otherwise unset settings are cleared
    pub ignore_unset: bool,
}

impl OperatorUpdate {
    pub fn new(package: &str) -> Self {
        OperatorUpdate {
            package: package.to_string(),
            ignore_unset: true,
            ..Default::default()
        }
    }

    /// Compute the desired spec from the current one.
    pub fn updated_spec(&self, current: &ClusterExtensionSpec) -> ClusterExtensionSpec {
        let mut spec = current.clone();
        let filter = spec.source.catalog.get_or_insert_with(|| CatalogFilter {
            package_name: self.package.clone(),
            ..Default::default()
        });

        if let Some(version) = &self.version {
            filter.version = Some(version.clone()).filter(|v| !v.is_empty());
        } else if !self.ignore_unset {
            filter.version = None;
        }

        if let Some(channels) = &self.channels {
            filter.channels = Some(channels.clone()).filter(|c| !c.is_empty());
        } else if !self.ignore_unset {
            filter.channels = None;
        }

        if let Some(selector) = &self.selector {
            // New labels replace the old ones; expressions can only be set outside this client
            let expressions = filter
                .selector
                .as_ref()
                .and_then(|s| s.match_expressions.clone())
                .filter(|_| self.ignore_unset);
            let mut next = LabelSelector::from_labels(selector).unwrap_or_default();
            next.match_expressions = expressions;
            filter.selector = (next != LabelSelector::default()).then_some(next);
        } else if !self.ignore_unset {
            filter.selector = None;
        }

        if let Some(policy) = self.upgrade_constraint_policy {
            filter.upgrade_constraint_policy = Some(policy);
        } else if !self.ignore_unset {
            filter.upgrade_constraint_policy = None;
        }

        spec
    }

    /// Apply the new settings and wait until the controller reports the
    /// updated generation as installed.
    #[instrument(skip_all, fields(package = %self.package))]
    pub async fn run<C>(&self, ctx: &OpContext, client: &C, config: &Config) -> Result<ClusterExtension>
    where
        C: Getter + Patcher,
    {
        if self.package.is_empty() {
            return Err(Error::InvalidArgument("package name is required".to_string()));
        }

        let current: ClusterExtension = fetch(ctx, client, &self.package).await?;
        let spec = self.updated_spec(&current.spec);
        if spec == current.spec {
            info!("Operator {} is already up to date", self.package);
            return Ok(current);
        }

        let mut desired = ClusterExtension::new(&self.package, spec);
        desired.metadata.labels = current.metadata.labels.clone();
        let applied = apply_object(ctx, client, &desired, &config.field_manager).await?;

        let generation = applied.metadata.generation;
        wait_until(ctx, client, &mut desired, config.poll_interval, |conds| {
            conds.iter().any(|c| {
                c.matches(conditions::INSTALLED, ConditionStatus::True)
                    && observed(c.observed_generation, generation)
            })
        })
        .await
        .map_err(|e| Error::WaitCondition {
            kind: "clusterextension".to_string(),
            name: self.package.clone(),
            condition: format!("{}={}", conditions::INSTALLED, ConditionStatus::True),
            source: Box::new(e),
        })?;

        info!("Operator {} updated", self.package);
        Ok(desired)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use kube::api::ObjectMeta;
use tracing::{info, instrument};

use super::rollback;
use crate::config::Config;
use crate::constants::{cluster_role_binding_name, conditions, labels, CLUSTER_ADMIN_ROLE, DEFAULT_CLEANUP_TIMEOUT};
use crate::error::{Error, Result};
use crate::kubernetes::{Deleter, Getter, Patcher};
use crate::lifecycle::{apply_object, wait_until, ManagedObject, OpContext};
use crate::types::extension::{CatalogFilter, LabelSelector, ServiceAccountReference, SourceConfig};
use crate::types::{ClusterExtension, ClusterExtensionSpec, ConditionStatus};

/// Install an operator package as a `ClusterExtension`.
#[derive(Debug, Clone)]
pub struct OperatorInstall {
    pub package: String,
    /// Namespace the operator is installed into
    pub namespace: String,
    pub channels: Vec<String>,
    /// Version or version range to resolve bundles from
    pub version: Option<String>,
    pub service_account: String,
    pub catalog_selector: BTreeMap<String, String>,
    /// Bind the service account to `cluster-admin`
    pub unsafe_create_cluster_role_binding: bool,
    /// Budget for removing what was created when the install does not succeed
    pub cleanup_timeout: Duration,
}

impl OperatorInstall {
    pub fn new(package: &str, namespace: &str) -> Self {
        OperatorInstall {
            package: package.to_string(),
            namespace: namespace.to_string(),
            channels: Vec::new(),
            version: None,
            service_account: "default".to_string(),
            catalog_selector: BTreeMap::new(),
            unsafe_create_cluster_role_binding: false,
            cleanup_timeout: DEFAULT_CLEANUP_TIMEOUT,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.package.is_empty() {
            return Err(Error::InvalidArgument("package name is required".to_string()));
        }
        if self.namespace.is_empty() {
            return Err(Error::InvalidArgument("namespace is required".to_string()));
        }
        if self.service_account.is_empty() {
            return Err(Error::InvalidArgument("service account is required".to_string()));
        }
        Ok(())
    }

    pub fn build_extension(&self) -> ClusterExtension {
        ClusterExtension::new(
            &self.package,
            ClusterExtensionSpec {
                namespace: self.namespace.clone(),
                service_account: ServiceAccountReference {
                    name: self.service_account.clone(),
                },
                source: SourceConfig {
                    source_type: "Catalog".to_string(),
                    catalog: Some(CatalogFilter {
                        package_name: self.package.clone(),
                        version: self.version.clone().filter(|v| !v.is_empty()),
                        channels: (!self.channels.is_empty()).then(|| self.channels.clone()),
                        selector: LabelSelector::from_labels(&self.catalog_selector),
                        upgrade_constraint_policy: None,
                    }),
                },
                install: None,
            },
        )
    }

    fn build_namespace(&self) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(self.namespace.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn build_service_account(&self) -> ServiceAccount {
        ServiceAccount {
            metadata: ObjectMeta {
                name: Some(self.service_account.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn build_cluster_role_binding(&self) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(cluster_role_binding_name(&self.package)),
                labels: Some(BTreeMap::from([
                    (labels::MANAGED_BY.to_string(), labels::MANAGED_BY_VALUE.to_string()),
                    (labels::EXTENSION.to_string(), self.package.clone()),
                ])),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".to_string(),
                kind: "ClusterRole".to_string(),
                name: CLUSTER_ADMIN_ROLE.to_string(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: self.service_account.clone(),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            }]),
        }
    }

    /// Apply the extension and its prerequisites, then wait for `Installed=True`.
    ///
    /// When the wait fails the extension (and the binding, if created) are
    /// deleted within `cleanup_timeout` before the error is returned.
    #[instrument(skip_all, fields(package = %self.package, namespace = %self.namespace))]
    pub async fn run<C>(&self, ctx: &OpContext, client: &C, config: &Config) -> Result<ClusterExtension>
    where
        C: Getter + Deleter + Patcher,
    {
        self.validate()?;

        apply_object(ctx, client, &self.build_namespace(), &config.field_manager).await?;
        apply_object(ctx, client, &self.build_service_account(), &config.field_manager).await?;

        let mut created: Vec<ManagedObject> = Vec::new();
        if self.unsafe_create_cluster_role_binding {
            let binding = self.build_cluster_role_binding();
            apply_object(ctx, client, &binding, &config.field_manager).await?;
            info!(
                "Bound service account {}/{} to {}",
                self.namespace, self.service_account, CLUSTER_ADMIN_ROLE
            );
            created.push(binding.into());
        }

        let mut extension = self.build_extension();
        let applied = match apply_object(ctx, client, &extension, &config.field_manager).await {
            Ok(applied) => applied,
            Err(e) => {
                rollback(client, &created, self.cleanup_timeout).await;
                return Err(e);
            }
        };
        created.insert(0, extension.clone().into());

        let generation = applied.metadata.generation;
        let installed = wait_until(ctx, client, &mut extension, config.poll_interval, |conds| {
            conds.iter().any(|c| {
                c.matches(conditions::INSTALLED, ConditionStatus::True)
                    && observed(c.observed_generation, generation)
            })
        })
        .await;

        if let Err(e) = installed {
            info!("Install did not complete, cleaning up");
            rollback(client, &created, self.cleanup_timeout).await;
            return Err(Error::WaitCondition {
                kind: "clusterextension".to_string(),
                name: self.package.clone(),
                condition: format!("{}={}", conditions::INSTALLED, ConditionStatus::True),
                source: Box::new(e),
            });
        }

        info!("Operator {} installed", self.package);
        Ok(extension)
    }
}

/// Whether a condition reflects at least the given object generation
pub(crate) fn observed(observed: Option<i64>, generation: Option<i64>) -> bool {
    match (observed, generation) {
        (Some(observed), Some(generation)) => observed >= generation,
        _ => true,
    }
}

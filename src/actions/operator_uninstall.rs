// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kube::api::ApiResource;
use tracing::{debug, info, instrument};

use super::fetch;
use crate::config::Config;
use crate::constants::{cluster_role_binding_name, labels};
use crate::error::{Error, Result};
use crate::kubernetes::{is_not_found, Deleter, Getter};
use crate::lifecycle::{delete_and_wait, ManagedObject, ObjectKey, OpContext};
use crate::types::ClusterExtension;

/// Remove an installed operator and wait until it is gone.
#[derive(Debug, Clone)]
pub struct OperatorUninstall {
    pub package: String,
}

impl OperatorUninstall {
    pub fn new(package: &str) -> Self {
        OperatorUninstall {
            package: package.to_string(),
        }
    }

    /// Tear down the extension, then the cluster role binding created for it
    /// at install time, if any. The binding outlives the extension so the
    /// operator's cleanup keeps its permissions.
    #[instrument(skip_all, fields(package = %self.package))]
    pub async fn run<C>(&self, ctx: &OpContext, client: &C, config: &Config) -> Result<()>
    where
        C: Getter + Deleter,
    {
        if self.package.is_empty() {
            return Err(Error::InvalidArgument("package name is required".to_string()));
        }

        let extension: ClusterExtension = fetch(ctx, client, &self.package).await?;
        delete_and_wait(ctx, client, &[extension.into()], config.poll_interval).await?;

        if let Some(binding) = self.owned_binding(ctx, client).await? {
            delete_and_wait(ctx, client, &[binding], config.poll_interval).await?;
        }

        info!("Operator {} uninstalled", self.package);
        Ok(())
    }

    /// The binding created by `--unsafe-create-cluster-role-binding`, if present.
    async fn owned_binding<G: Getter>(&self, ctx: &OpContext, getter: &G) -> Result<Option<ManagedObject>> {
        let resource = ApiResource::erase::<ClusterRoleBinding>(&());
        let key = ObjectKey::new(None, &cluster_role_binding_name(&self.package), &resource.kind);

        let object = match ctx.run(getter.get(&resource, &key)).await? {
            Ok(object) => object,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let label = |name: &str| {
            object
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get(name))
                .cloned()
        };
        let owned = label(labels::MANAGED_BY).as_deref() == Some(labels::MANAGED_BY_VALUE)
            && label(labels::EXTENSION).as_deref() == Some(self.package.as_str());
        if !owned {
            debug!("Cluster role binding {} was not created for this operator, keeping it", key);
            return Ok(None);
        }

        Ok(Some(ManagedObject::Dynamic { object, resource }))
    }
}

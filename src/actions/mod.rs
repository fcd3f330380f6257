// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle actions invoked by the command line: each converges cluster state
//! with the lifecycle primitives and blocks until the control plane reports
//! the outcome.

pub mod catalog_create;
pub mod catalog_delete;
pub mod get;
pub mod operator_install;
pub mod operator_uninstall;
pub mod operator_update;

pub use catalog_create::CatalogCreate;
pub use catalog_delete::CatalogDelete;
pub use get::{get_catalogs, get_operators};
pub use operator_install::OperatorInstall;
pub use operator_uninstall::OperatorUninstall;
pub use operator_update::OperatorUpdate;

use kube::api::ApiResource;
use kube::Resource;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, Result};
use crate::kubernetes::{is_not_found, Deleter, Getter, Lister};
use crate::lifecycle::poll::parse_object;
use crate::lifecycle::{delete_with_timeout, ManagedObject, ObjectKey, OpContext};

/// Fetch a cluster-scoped object by name; absence is reported as [`Error::NotFound`].
pub(crate) async fn fetch<K, G>(ctx: &OpContext, getter: &G, name: &str) -> Result<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
    G: Getter,
{
    let resource = ApiResource::erase::<K>(&());
    let key = ObjectKey::new(None, name, &resource.kind);
    match ctx.run(getter.get(&resource, &key)).await? {
        Ok(object) => parse_object(object, &key),
        Err(e) if is_not_found(&e) => Err(Error::NotFound {
            kind: key.lower_kind(),
            name: key.name,
        }),
        Err(e) => Err(e.into()),
    }
}

/// List all cluster-scoped objects of kind `K`.
pub(crate) async fn list<K, L>(ctx: &OpContext, lister: &L) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
    L: Lister,
{
    let resource = ApiResource::erase::<K>(&());
    ctx.run(lister.list(&resource, None))
        .await??
        .into_iter()
        .map(|object| {
            let key = ObjectKey::of_dynamic(&object, &resource);
            parse_object(object, &key)
        })
        .collect()
}

/// Best-effort removal of objects created by a failed action, each bounded by `timeout`.
pub(crate) async fn rollback<D>(deleter: &D, objects: &[ManagedObject], timeout: std::time::Duration)
where
    D: Deleter,
{
    for object in objects {
        if let Err(e) = delete_with_timeout(deleter, object, timeout).await {
            warn!(
                "Failed to clean up {} {}: {}",
                object.kind().to_lowercase(),
                object.key(),
                e
            );
        }
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The narrow set of API calls the lifecycle primitives depend on.
//!
//! Every call goes through [`DynamicObject`] keyed by an [`ApiResource`], so one
//! implementation covers cluster-scoped custom resources and namespaced built-in
//! kinds alike. Typed objects are converted at the edges.

use std::future::Future;

use kube::{
    api::{ApiResource, DeleteParams, DynamicObject, ListParams, Patch, PatchParams},
    Api, Client,
};
use tracing::debug;

use crate::lifecycle::ObjectKey;

/// Fetch a single object by identity.
pub trait Getter: Sync {
    fn get(
        &self,
        resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send;
}

/// List all objects of a resource, optionally within one namespace.
pub trait Lister: Sync {
    fn list(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, kube::Error>> + Send;
}

/// Issue a delete request. Deletion may complete asynchronously on the server.
pub trait Deleter: Sync {
    fn delete(
        &self,
        resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<(), kube::Error>> + Send;
}

/// Server-side apply of a generic object.
pub trait Patcher: Sync {
    fn apply(
        &self,
        resource: &ApiResource,
        object: &DynamicObject,
        field_manager: &str,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send;
}

/// Whether an API error reports the requested object as absent
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

fn dynamic_api(client: &Client, resource: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
    match namespace {
        Some(ns) => Api::namespaced_with(client.clone(), ns, resource),
        None => Api::all_with(client.clone(), resource),
    }
}

impl Getter for Client {
    fn get(
        &self,
        resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send {
        let api = dynamic_api(self, resource, key.namespace.as_deref());
        let name = key.name.clone();
        async move { api.get(&name).await }
    }
}

impl Lister for Client {
    fn list(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, kube::Error>> + Send {
        let api = dynamic_api(self, resource, namespace);
        async move { Ok(api.list(&ListParams::default()).await?.items) }
    }
}

impl Deleter for Client {
    fn delete(
        &self,
        resource: &ApiResource,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<(), kube::Error>> + Send {
        let api = dynamic_api(self, resource, key.namespace.as_deref());
        let name = key.name.clone();
        async move {
            let res = api.delete(&name, &DeleteParams::default()).await?;
            if res.is_right() {
                debug!("Delete of {} completed immediately", name);
            }
            Ok(())
        }
    }
}

impl Patcher for Client {
    fn apply(
        &self,
        resource: &ApiResource,
        object: &DynamicObject,
        field_manager: &str,
    ) -> impl Future<Output = Result<DynamicObject, kube::Error>> + Send {
        let api = dynamic_api(self, resource, object.metadata.namespace.as_deref());
        let name = object.metadata.name.clone().unwrap_or_default();
        let params = PatchParams::apply(field_manager).force();
        let object = object.clone();
        async move { api.patch(&name, &params, &Patch::Apply(&object)).await }
    }
}

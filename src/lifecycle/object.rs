// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kube::{
    api::{ApiResource, DynamicObject},
    Resource,
};

use super::identity::ObjectKey;
use crate::types::{ClusterCatalog, ClusterExtension};

/// The closed set of objects the client creates and tears down.
///
/// Each variant knows its own kind and API resource, so a minimally populated
/// object (just metadata) is enough to address it.
#[derive(Debug, Clone)]
pub enum ManagedObject {
    Catalog(ClusterCatalog),
    Extension(ClusterExtension),
    Namespace(Namespace),
    ServiceAccount(ServiceAccount),
    ClusterRoleBinding(ClusterRoleBinding),
    Dynamic {
        object: DynamicObject,
        resource: ApiResource,
    },
}

impl ManagedObject {
    pub fn api_resource(&self) -> ApiResource {
        match self {
            ManagedObject::Catalog(_) => ApiResource::erase::<ClusterCatalog>(&()),
            ManagedObject::Extension(_) => ApiResource::erase::<ClusterExtension>(&()),
            ManagedObject::Namespace(_) => ApiResource::erase::<Namespace>(&()),
            ManagedObject::ServiceAccount(_) => ApiResource::erase::<ServiceAccount>(&()),
            ManagedObject::ClusterRoleBinding(_) => ApiResource::erase::<ClusterRoleBinding>(&()),
            ManagedObject::Dynamic { resource, .. } => resource.clone(),
        }
    }

    pub fn kind(&self) -> String {
        self.key().kind
    }

    pub fn key(&self) -> ObjectKey {
        match self {
            ManagedObject::Catalog(o) => ObjectKey::of(o),
            ManagedObject::Extension(o) => ObjectKey::of(o),
            ManagedObject::Namespace(o) => ObjectKey::of(o),
            ManagedObject::ServiceAccount(o) => ObjectKey::of(o),
            ManagedObject::ClusterRoleBinding(o) => ObjectKey::of(o),
            ManagedObject::Dynamic { object, resource } => ObjectKey::of_dynamic(object, resource),
        }
    }

    /// Reference to a cluster-scoped object of kind `K` by name only.
    pub fn named<K>(name: &str) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        let resource = ApiResource::erase::<K>(&());
        ManagedObject::Dynamic {
            object: DynamicObject::new(name, &resource),
            resource,
        }
    }
}

impl From<ClusterCatalog> for ManagedObject {
    fn from(o: ClusterCatalog) -> Self {
        ManagedObject::Catalog(o)
    }
}

impl From<ClusterExtension> for ManagedObject {
    fn from(o: ClusterExtension) -> Self {
        ManagedObject::Extension(o)
    }
}

impl From<Namespace> for ManagedObject {
    fn from(o: Namespace) -> Self {
        ManagedObject::Namespace(o)
    }
}

impl From<ServiceAccount> for ManagedObject {
    fn from(o: ServiceAccount) -> Self {
        ManagedObject::ServiceAccount(o)
    }
}

impl From<ClusterRoleBinding> for ManagedObject {
    fn from(o: ClusterRoleBinding) -> Self {
        ManagedObject::ClusterRoleBinding(o)
    }
}

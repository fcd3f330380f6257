// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use kube::{
    api::{ApiResource, DynamicObject},
    Resource, ResourceExt,
};

/// Identity of a remote object: the lookup key for gets and deletes and the
/// name used in messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    /// `None` for cluster-scoped objects
    pub namespace: Option<String>,
    pub name: String,
    pub kind: String,
}

impl ObjectKey {
    pub fn new(namespace: Option<&str>, name: &str, kind: &str) -> Self {
        ObjectKey {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Key for a typed object; the kind comes from the type itself.
    pub fn of<K>(obj: &K) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        ObjectKey {
            namespace: obj.namespace(),
            name: obj.name_any(),
            kind: K::kind(&()).into_owned(),
        }
    }

    /// Key for a generic object, falling back to the resource's kind when the
    /// object carries no type metadata.
    pub fn of_dynamic(obj: &DynamicObject, resource: &ApiResource) -> Self {
        let kind = obj
            .types
            .as_ref()
            .map(|t| t.kind.as_str())
            .filter(|k| !k.is_empty())
            .unwrap_or(&resource.kind);
        ObjectKey {
            namespace: obj.namespace(),
            name: obj.name_any(),
            kind: kind.to_string(),
        }
    }

    /// Lower-cased kind, as used in error messages
    pub fn lower_kind(&self) -> String {
        self.kind.to_lowercase()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

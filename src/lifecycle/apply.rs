// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{
    api::{ApiResource, DynamicObject},
    core::TypeMeta,
    Resource,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::context::OpContext;
use super::identity::ObjectKey;
use crate::error::{Error, Result};
use crate::kubernetes::Patcher;

/// Convert a typed object into its generic form, keeping every field.
pub fn to_dynamic<K>(object: &K) -> Result<DynamicObject>
where
    K: Resource<DynamicType = ()> + Serialize,
{
    let resource = ApiResource::erase::<K>(&());
    let value = serde_json::to_value(object)?;
    let mut dynamic: DynamicObject = serde_json::from_value(value)?;

    if dynamic.metadata.name.as_deref().unwrap_or_default().is_empty() {
        return Err(Error::MissingName {
            kind: resource.kind.to_lowercase(),
        });
    }
    if dynamic.types.as_ref().map_or(true, |t| t.kind.is_empty()) {
        dynamic.types = Some(TypeMeta {
            api_version: resource.api_version.clone(),
            kind: resource.kind.clone(),
        });
    }
    Ok(dynamic)
}

/// Create or update `object` with a server-side apply owned by `field_manager`.
///
/// Applying the same desired state repeatedly converges to that state.
#[instrument(skip_all, fields(object = %ObjectKey::of(object)))]
pub async fn apply_object<K, P>(
    ctx: &OpContext,
    patcher: &P,
    object: &K,
    field_manager: &str,
) -> Result<DynamicObject>
where
    K: Resource<DynamicType = ()> + Serialize,
    P: Patcher,
{
    let dynamic = to_dynamic(object)?;
    let resource = ApiResource::erase::<K>(&());
    let applied = ctx
        .run(patcher.apply(&resource, &dynamic, field_manager))
        .await??;
    debug!(
        "Applied {} (resourceVersion {:?})",
        resource.kind,
        applied.metadata.resource_version
    );
    Ok(applied)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turn eventually-consistent status conditions into a blocking wait.

use std::time::Duration;

use kube::{
    api::{ApiResource, DynamicObject},
    Resource,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::context::OpContext;
use super::identity::ObjectKey;
use crate::error::{Error, Result};
use crate::kubernetes::Getter;
use crate::types::{Condition, ConditionStatus, HasConditions};

/// Re-fetch `object` every `interval` until `predicate` holds for its conditions.
///
/// The first fetch happens immediately. `object` is overwritten with every
/// fetched state, so after success it carries the full latest status. Any
/// fetch error ends the wait, as does the context finishing.
#[instrument(skip_all, fields(object = %ObjectKey::of(&*object)))]
pub async fn wait_until<K, G, P>(
    ctx: &OpContext,
    getter: &G,
    object: &mut K,
    interval: Duration,
    predicate: P,
) -> Result<()>
where
    K: Resource<DynamicType = ()> + HasConditions + DeserializeOwned,
    G: Getter,
    P: Fn(&[Condition]) -> bool,
{
    let resource = ApiResource::erase::<K>(&());
    let key = ObjectKey::of(&*object);

    loop {
        let fetched = ctx.run(getter.get(&resource, &key)).await??;
        *object = parse_object(fetched, &key)?;

        if predicate(object.conditions()) {
            return Ok(());
        }
        debug!("Conditions not yet satisfied, retrying in {:?}", interval);
        ctx.sleep(interval).await?;
    }
}

/// Wait until `object` reports a condition of `condition_type` with `status`.
pub async fn wait_until_status_condition<K, G>(
    ctx: &OpContext,
    getter: &G,
    object: &mut K,
    interval: Duration,
    condition_type: &str,
    status: ConditionStatus,
) -> Result<()>
where
    K: Resource<DynamicType = ()> + HasConditions + DeserializeOwned,
    G: Getter,
{
    let key = ObjectKey::of(&*object);
    wait_until(ctx, getter, object, interval, |conditions| {
        conditions.iter().any(|c| c.matches(condition_type, status))
    })
    .await
    .map_err(|e| Error::WaitCondition {
        kind: key.lower_kind(),
        name: key.name,
        condition: format!("{}={}", condition_type, status),
        source: Box::new(e),
    })
}

/// Decode a fetched generic object into its typed form.
pub(crate) fn parse_object<K: DeserializeOwned>(object: DynamicObject, key: &ObjectKey) -> Result<K> {
    let value = serde_json::to_value(object)?;
    serde_json::from_value(value).map_err(|e| Error::Parse {
        kind: key.lower_kind(),
        name: key.name.clone(),
        message: e.to_string(),
    })
}

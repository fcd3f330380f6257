// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deleting objects and confirming they are gone.

use std::time::Duration;

use futures::future::join_all;
use kube::api::ApiResource;
use tracing::{debug, instrument};

use super::context::OpContext;
use super::identity::ObjectKey;
use super::object::ManagedObject;
use crate::error::{Error, Result, TeardownError};
use crate::kubernetes::{is_not_found, Deleter, Getter};

/// Issue one delete bounded by `timeout`, regardless of any caller cancellation.
///
/// An object that is already absent counts as deleted. Does not wait for the
/// object to disappear.
#[instrument(skip_all, fields(object = %object.key(), timeout = ?timeout))]
pub async fn delete_with_timeout<D>(deleter: &D, object: &ManagedObject, timeout: Duration) -> Result<()>
where
    D: Deleter,
{
    let ctx = OpContext::detached(timeout);
    match ctx.run(deleter.delete(&object.api_resource(), &object.key())).await? {
        Ok(()) => Ok(()),
        Err(e) if is_not_found(&e) => {
            debug!("Already deleted");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Poll until a fetch of `key` reports not found.
async fn poll_until_absent<G>(
    ctx: &OpContext,
    getter: &G,
    resource: &ApiResource,
    key: &ObjectKey,
    interval: Duration,
) -> Result<()>
where
    G: Getter,
{
    loop {
        match ctx.run(getter.get(resource, key)).await? {
            Err(e) if is_not_found(&e) => return Ok(()),
            Err(e) => return Err(e.into()),
            Ok(_) => debug!("{} {} still present", key.kind, key),
        }
        ctx.sleep(interval).await?;
    }
}

/// Wait for each object in turn to disappear. The first failure ends the wait.
pub async fn wait_for_deletion<G>(
    ctx: &OpContext,
    getter: &G,
    objects: &[ManagedObject],
    interval: Duration,
) -> Result<()>
where
    G: Getter,
{
    for object in objects {
        let key = object.key();
        poll_until_absent(ctx, getter, &object.api_resource(), &key, interval)
            .await
            .map_err(|e| Error::WaitDeleted {
                kind: key.lower_kind(),
                name: key.name.clone(),
                source: Box::new(e),
            })?;
    }
    Ok(())
}

/// Delete every object concurrently and wait until each one is gone.
///
/// All objects are processed to completion; failures are collected per object,
/// in input order, into a single [`TeardownError`].
#[instrument(skip_all, fields(count = objects.len()))]
pub async fn delete_and_wait<C>(
    ctx: &OpContext,
    client: &C,
    objects: &[ManagedObject],
    interval: Duration,
) -> Result<()>
where
    C: Getter + Deleter,
{
    let results = join_all(
        objects
            .iter()
            .map(|object| delete_one_and_wait(ctx, client, object, interval)),
    )
    .await;

    let errors: Vec<Error> = results.into_iter().filter_map(Result::err).collect();
    match TeardownError::from_errors(errors) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

async fn delete_one_and_wait<C>(
    ctx: &OpContext,
    client: &C,
    object: &ManagedObject,
    interval: Duration,
) -> Result<()>
where
    C: Getter + Deleter,
{
    let resource = object.api_resource();
    let key = object.key();

    let deleted = match ctx.run(client.delete(&resource, &key)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if is_not_found(&e) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(e),
    };
    deleted.map_err(|e| Error::Delete {
        kind: key.lower_kind(),
        name: key.name.clone(),
        source: Box::new(e),
    })?;

    poll_until_absent(ctx, client, &resource, &key, interval)
        .await
        .map_err(|e| Error::WaitDeleted {
            kind: key.lower_kind(),
            name: key.name.clone(),
            source: Box::new(e),
        })?;

    debug!("Deleted {} {}", key.lower_kind(), key);
    Ok(())
}

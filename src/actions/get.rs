// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::Resource;
use serde::de::DeserializeOwned;

use super::{fetch, list};
use crate::error::Result;
use crate::kubernetes::{Getter, Lister};
use crate::lifecycle::OpContext;
use crate::types::{ClusterCatalog, ClusterExtension};

async fn get_or_list<K, C>(ctx: &OpContext, client: &C, name: Option<&str>) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
    C: Getter + Lister,
{
    match name {
        Some(name) => Ok(vec![fetch(ctx, client, name).await?]),
        None => list(ctx, client).await,
    }
}

/// The named operator, or every installed operator.
pub async fn get_operators<C>(ctx: &OpContext, client: &C, name: Option<&str>) -> Result<Vec<ClusterExtension>>
where
    C: Getter + Lister,
{
    get_or_list(ctx, client, name).await
}

/// The named catalog, or every catalog.
pub async fn get_catalogs<C>(ctx: &OpContext, client: &C, name: Option<&str>) -> Result<Vec<ClusterCatalog>>
where
    C: Getter + Lister,
{
    get_or_list(ctx, client, name).await
}

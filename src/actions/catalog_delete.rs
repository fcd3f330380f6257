// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use tracing::{info, instrument};

use super::{fetch, list};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::kubernetes::{Deleter, Getter, Lister};
use crate::lifecycle::{delete_and_wait, ManagedObject, OpContext};
use crate::types::ClusterCatalog;

/// Delete one named catalog, or every catalog in the cluster.
#[derive(Debug, Clone, Default)]
pub struct CatalogDelete {
    pub name: Option<String>,
    pub all: bool,
}

impl CatalogDelete {
    pub fn named(name: &str) -> Self {
        CatalogDelete {
            name: Some(name.to_string()),
            all: false,
        }
    }

    pub fn all() -> Self {
        CatalogDelete { name: None, all: true }
    }

    fn validate(&self) -> Result<()> {
        match (&self.name, self.all) {
            (Some(_), true) => Err(Error::InvalidArgument(
                "cannot specify both a catalog name and --all".to_string(),
            )),
            (None, false) => Err(Error::InvalidArgument(
                "a catalog name or --all is required".to_string(),
            )),
            (Some(name), false) if name.is_empty() => {
                Err(Error::InvalidArgument("catalog name is required".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Delete the selected catalogs concurrently and wait until all are gone.
    /// Returns the names of the catalogs that were deleted.
    #[instrument(skip_all, fields(name = ?self.name, all = self.all))]
    pub async fn run<C>(&self, ctx: &OpContext, client: &C, config: &Config) -> Result<Vec<String>>
    where
        C: Getter + Lister + Deleter,
    {
        self.validate()?;

        let catalogs: Vec<ClusterCatalog> = match &self.name {
            Some(name) => vec![fetch(ctx, client, name).await?],
            None => list(ctx, client).await?,
        };
        if catalogs.is_empty() {
            return Err(Error::NothingToDelete {
                kind: "catalog".to_string(),
            });
        }

        let names: Vec<String> = catalogs
            .iter()
            .filter_map(|c| c.metadata.name.clone())
            .collect();
        let objects: Vec<ManagedObject> = catalogs.into_iter().map(Into::into).collect();
        delete_and_wait(ctx, client, &objects, config.poll_interval).await?;

        info!("Deleted {} catalog(s)", names.len());
        Ok(names)
    }
}

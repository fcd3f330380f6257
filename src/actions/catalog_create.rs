// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{info, instrument};

use super::rollback;
use crate::config::Config;
use crate::constants::{conditions, DEFAULT_CLEANUP_TIMEOUT};
use crate::error::{Error, Result};
use crate::kubernetes::{Deleter, Getter, Patcher};
use crate::lifecycle::{apply_object, wait_until_status_condition, OpContext};
use crate::types::catalog::{AvailabilityMode, CatalogSource, ImageSource};
use crate::types::{ClusterCatalog, ClusterCatalogSpec, ConditionStatus};

/// Create a `ClusterCatalog` backed by a catalog image.
#[derive(Debug, Clone)]
pub struct CatalogCreate {
    pub name: String,
    pub image_ref: String,
    pub priority: Option<i32>,
    pub labels: BTreeMap<String, String>,
    pub poll_interval_minutes: Option<i32>,
    /// When false the catalog is created disabled and no wait takes place
    pub available: bool,
    pub cleanup_timeout: Duration,
}

impl CatalogCreate {
    pub fn new(name: &str, image_ref: &str) -> Self {
        CatalogCreate {
            name: name.to_string(),
            image_ref: image_ref.to_string(),
            priority: None,
            labels: BTreeMap::new(),
            poll_interval_minutes: None,
            available: true,
            cleanup_timeout: DEFAULT_CLEANUP_TIMEOUT,
        }
    }

    pub fn build_catalog(&self) -> ClusterCatalog {
        let mut catalog = ClusterCatalog::new(
            &self.name,
            ClusterCatalogSpec {
                source: CatalogSource {
                    source_type: "Image".to_string(),
                    image: Some(ImageSource {
                        reference: self.image_ref.clone(),
                        poll_interval_minutes: self.poll_interval_minutes,
                    }),
                },
                priority: self.priority,
                availability_mode: Some(if self.available {
                    AvailabilityMode::Available
                } else {
                    AvailabilityMode::Unavailable
                }),
            },
        );
        if !self.labels.is_empty() {
            catalog.metadata.labels = Some(self.labels.clone());
        }
        catalog
    }

    /// Apply the catalog and, unless it is disabled, wait for `Serving=True`.
    /// A catalog that never serves is deleted again before the error is returned.
    #[instrument(skip_all, fields(catalog = %self.name))]
    pub async fn run<C>(&self, ctx: &OpContext, client: &C, config: &Config) -> Result<ClusterCatalog>
    where
        C: Getter + Deleter + Patcher,
    {
        if self.name.is_empty() {
            return Err(Error::InvalidArgument("catalog name is required".to_string()));
        }
        if self.image_ref.is_empty() {
            return Err(Error::InvalidArgument("image reference is required".to_string()));
        }

        let mut catalog = self.build_catalog();
        apply_object(ctx, client, &catalog, &config.field_manager).await?;

        if !self.available {
            info!("Catalog {} created as unavailable", self.name);
            return Ok(catalog);
        }

        let serving = wait_until_status_condition(
            ctx,
            client,
            &mut catalog,
            config.poll_interval,
            conditions::SERVING,
            ConditionStatus::True,
        )
        .await;

        if let Err(e) = serving {
            info!("Catalog did not start serving, cleaning up");
            rollback(client, &[self.build_catalog().into()], self.cleanup_timeout).await;
            return Err(e);
        }

        info!("Catalog {} is serving", self.name);
        Ok(catalog)
    }
}

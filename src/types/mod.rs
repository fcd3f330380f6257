// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resources managed by the client and their status conditions.

pub mod catalog;
pub mod condition;
pub mod extension;

pub use catalog::{ClusterCatalog, ClusterCatalogSpec, ClusterCatalogStatus};
pub use condition::{Condition, ConditionStatus, HasConditions};
pub use extension::{ClusterExtension, ClusterExtensionSpec, ClusterExtensionStatus};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client construction and the API capabilities used by the lifecycle primitives.

pub mod capabilities;
pub mod client;

pub use capabilities::{is_not_found, Deleter, Getter, Lister, Patcher};
pub use client::create_client;

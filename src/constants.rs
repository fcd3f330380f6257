// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Field manager recorded on every server-side apply
pub const FIELD_MANAGER: &str = "kubectl-operator";

/// Fixed interval between two fetches of a polled object
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default budget for best-effort rollback after a failed create
pub const DEFAULT_CLEANUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Status condition types reported by the extension controllers
pub mod conditions {
    pub const INSTALLED: &str = "Installed";
    pub const PROGRESSING: &str = "Progressing";
    pub const SERVING: &str = "Serving";
}

/// Cluster role bound to an operator's service account by `--unsafe-create-cluster-role-binding`
pub const CLUSTER_ADMIN_ROLE: &str = "cluster-admin";

/// Name of the cluster role binding created for an operator's service account
pub fn cluster_role_binding_name(package: &str) -> String {
    format!("{}-cluster-admin", package)
}

/// Labels stamped on objects the client creates on behalf of an extension
pub mod labels {
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "kubectl-operator";
    pub const EXTENSION: &str = "app.kubernetes.io/part-of";
}

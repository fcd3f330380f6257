// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource lifecycle primitives: apply, wait for conditions, delete and
//! confirm disappearance.

pub mod apply;
pub mod context;
pub mod deletion;
pub mod identity;
pub mod object;
pub mod poll;

pub use apply::{apply_object, to_dynamic};
pub use context::OpContext;
pub use deletion::{delete_and_wait, delete_with_timeout, wait_for_deletion};
pub use identity::ObjectKey;
pub use object::ManagedObject;
pub use poll::{wait_until, wait_until_status_condition};

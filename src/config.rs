// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::constants::{FIELD_MANAGER, POLL_INTERVAL};

/// Client settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between two fetches while waiting on a remote object
    pub poll_interval: Duration,
    /// Field manager used for server-side apply
    pub field_manager: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll_interval: POLL_INTERVAL,
            field_manager: FIELD_MANAGER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(ms) = lookup("OLMCTL_POLL_INTERVAL_MS") {
            let ms: u64 = ms
                .parse()
                .context("OLMCTL_POLL_INTERVAL_MS must be a number of milliseconds")?;
            anyhow::ensure!(ms > 0, "OLMCTL_POLL_INTERVAL_MS must be greater than zero");
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(manager) = lookup("OLMCTL_FIELD_MANAGER").filter(|m| !m.is_empty()) {
            config.field_manager = manager;
        }

        Ok(config)
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cancellation and deadlines for blocking waits.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Cancellation signal plus an optional deadline, passed down from the command.
///
/// Children derived with [`OpContext::with_timeout`] are cancelled with their
/// parent and never outlive its deadline.
#[derive(Debug, Clone)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for OpContext {
    fn default() -> Self {
        Self::background()
    }
}

impl OpContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        OpContext {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Child context whose deadline is the earlier of the parent's and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        OpContext {
            token: self.token.child_token(),
            deadline: Some(match self.deadline {
                Some(parent) if parent < candidate => parent,
                _ => candidate,
            }),
        }
    }

    /// Fresh context bounded only by `timeout`, unaffected by any parent.
    pub fn detached(timeout: Duration) -> Self {
        Self::background().with_timeout(timeout)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Error if the context is already done, checked without suspending.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Error {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => Error::Cancelled,
                _ = sleep_until(deadline) => Error::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                Error::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        self.check()?;
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }

    /// Suspend for `interval`, or fail early when the context finishes.
    pub async fn sleep(&self, interval: Duration) -> Result<()> {
        self.run(sleep(interval)).await
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;
const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Only watch Applications in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
    /// Delay before retrying a failed reconcile
    pub error_requeue: Duration,
    /// Deadline for a single reconcile cycle, none when disabled
    pub reconcile_timeout: Option<Duration>,
    /// Periodic re-reconcile of converged Applications to revert drift
    pub resync_interval: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let error_requeue = secs(&lookup, "ERROR_REQUEUE_SECS")?
            .unwrap_or(DEFAULT_ERROR_REQUEUE_SECS);
        // 0 disables the deadline
        let reconcile_timeout = secs(&lookup, "RECONCILE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_RECONCILE_TIMEOUT_SECS);
        let resync_interval = secs(&lookup, "RESYNC_INTERVAL_SECS")?;

        Ok(Config {
            watch_namespace,
            error_requeue: Duration::from_secs(error_requeue),
            reconcile_timeout: (reconcile_timeout > 0).then(|| Duration::from_secs(reconcile_timeout)),
            resync_interval: resync_interval
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
        })
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of seconds, got {:?}", key, value))
        })
        .transpose()
}

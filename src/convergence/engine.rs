// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::{CraneError, Operation, Result};
use crate::kubernetes::gateway::{ClusterGateway, Deletion};
use crate::resources::ManagedKind;
use crate::types::{AppId, Application};
use crate::validation::validate;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::Resource;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// What happened to one managed kind during a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindChange {
    Created,
    Updated,
    Deleted,
    AlreadyAbsent,
}

/// Result of a completed cycle, per managed kind in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The application exists and its objects were created or overwritten
    Applied(Vec<(String, KindChange)>),
    /// The application is gone and its objects were removed
    Removed(Vec<(String, KindChange)>),
}

/// Converges the managed objects of one Application per call.
///
/// Holds no state between calls: every decision is made on objects read
/// within the same cycle. Concurrent calls for different applications are
/// fine; the caller must not run two cycles for the same application at once.
pub struct Engine<G> {
    gateway: G,
    timeout: Option<Duration>,
}

impl<G: ClusterGateway> Engine<G> {
    pub fn new(gateway: G, timeout: Option<Duration>) -> Self {
        Self { gateway, timeout }
    }

    /// Run one cycle for `id`.
    ///
    /// Returns `Cancelled` or `DeadlineExceeded` if the cycle is interrupted;
    /// calls already issued are not rolled back.
    #[instrument(skip(self, cancel), fields(application = %id))]
    pub async fn reconcile(&self, id: &AppId, cancel: &CancellationToken) -> Result<Outcome> {
        self.bounded(id, self.converge(id, cancel)).await
    }

    /// Run only the delete branch for `id`, without reading the Application.
    ///
    /// Used when the Application is known to be going away, e.g. while it is
    /// held by a finalizer. Interruption is reported as for `reconcile`.
    #[instrument(skip(self, cancel), fields(application = %id))]
    pub async fn cleanup(&self, id: &AppId, cancel: &CancellationToken) -> Result<Outcome> {
        self.bounded(id, self.remove(id, cancel)).await
    }

    async fn bounded(
        &self,
        id: &AppId,
        cycle: impl Future<Output = Result<Outcome>>,
    ) -> Result<Outcome> {
        let Some(timeout) = self.timeout else {
            return cycle.await;
        };
        match tokio::time::timeout(timeout, cycle).await {
            Ok(result) => result,
            Err(_) => Err(CraneError::DeadlineExceeded {
                application: id.to_string(),
                timeout,
            }),
        }
    }

    async fn converge(&self, id: &AppId, cancel: &CancellationToken) -> Result<Outcome> {
        let app = self
            .guard(id, cancel, self.gateway.get_application(&id.namespace, &id.name))
            .await?
            .map_err(|source| {
                CraneError::api(Operation::Get, Application::kind(&()), id, source)
            })?;

        let Some(app) = app else {
            info!("Application not found, removing managed objects");
            return self.remove(id, cancel).await;
        };
        if app.meta().deletion_timestamp.is_some() {
            info!("Application is being deleted, removing managed objects");
            return self.remove(id, cancel).await;
        }

        validate(&app.spec).map_err(|source| CraneError::InvalidSpec {
            application: id.to_string(),
            source,
        })?;

        self.apply(&app, id, cancel).await
    }

    async fn apply(
        &self,
        app: &Application,
        id: &AppId,
        cancel: &CancellationToken,
    ) -> Result<Outcome> {
        let mut changes = Vec::new();
        let mut failures = Vec::new();

        // Each kind is applied on its own: a kind that already exists is
        // updated even when its sibling had to be created this cycle.
        settle(
            self.apply_kind::<Deployment>(app, id, cancel).await,
            &mut changes,
            &mut failures,
        )?;
        settle(
            self.apply_kind::<Service>(app, id, cancel).await,
            &mut changes,
            &mut failures,
        )?;

        finish(Outcome::Applied(changes), failures)
    }

    async fn apply_kind<K: ManagedKind>(
        &self,
        app: &Application,
        id: &AppId,
        cancel: &CancellationToken,
    ) -> Result<(String, KindChange)> {
        let kind = K::kind_name();
        let name = id.managed_name();
        let object = format!("{}/{}", id.namespace, name);

        let live = self
            .guard(id, cancel, self.gateway.get::<K>(&id.namespace, &name))
            .await?
            .map_err(|source| CraneError::api(Operation::Get, &kind, &object, source))?;

        let desired = K::desired(app);
        let change = match live {
            None => {
                self.guard(id, cancel, self.gateway.create(&id.namespace, &desired))
                    .await?
                    .map_err(|source| CraneError::api(Operation::Create, &kind, &object, source))?;
                info!("Created {} {}", kind, object);
                KindChange::Created
            }
            Some(mut live) => {
                K::overwrite_spec(&mut live, desired);
                self.guard(id, cancel, self.gateway.update(&id.namespace, &live))
                    .await?
                    .map_err(|source| CraneError::api(Operation::Update, &kind, &object, source))?;
                debug!("Updated {} {}", kind, object);
                KindChange::Updated
            }
        };

        Ok((kind, change))
    }

    async fn remove(&self, id: &AppId, cancel: &CancellationToken) -> Result<Outcome> {
        let mut changes = Vec::new();
        let mut failures = Vec::new();

        settle(
            self.remove_kind::<Deployment>(id, cancel).await,
            &mut changes,
            &mut failures,
        )?;
        settle(
            self.remove_kind::<Service>(id, cancel).await,
            &mut changes,
            &mut failures,
        )?;

        finish(Outcome::Removed(changes), failures)
    }

    async fn remove_kind<K: ManagedKind>(
        &self,
        id: &AppId,
        cancel: &CancellationToken,
    ) -> Result<(String, KindChange)> {
        let kind = K::kind_name();
        let name = id.managed_name();

        let deletion = self
            .guard(id, cancel, self.gateway.delete::<K>(&id.namespace, &name))
            .await?
            .map_err(|source| {
                CraneError::api(
                    Operation::Delete,
                    &kind,
                    format!("{}/{}", id.namespace, name),
                    source,
                )
            })?;

        let change = match deletion {
            Deletion::Deleted => {
                info!("Deleted {} {}/{}", kind, id.namespace, name);
                KindChange::Deleted
            }
            Deletion::AlreadyAbsent => KindChange::AlreadyAbsent,
        };
        Ok((kind, change))
    }

    /// Race an API call against the caller's cancellation
    async fn guard<T>(
        &self,
        id: &AppId,
        cancel: &CancellationToken,
        call: impl Future<Output = T>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CraneError::Cancelled {
                application: id.to_string(),
            }),
            output = call => Ok(output),
        }
    }
}

/// Keep going after a per-kind failure, but stop on interruption
fn settle(
    result: Result<(String, KindChange)>,
    changes: &mut Vec<(String, KindChange)>,
    failures: &mut Vec<CraneError>,
) -> Result<()> {
    match result {
        Ok(change) => changes.push(change),
        Err(err) if err.is_interrupted() => return Err(err),
        Err(err) => {
            warn!("{}", err);
            failures.push(err);
        }
    }
    Ok(())
}

fn finish(outcome: Outcome, failures: Vec<CraneError>) -> Result<Outcome> {
    match CraneError::collect(failures) {
        Some(err) => Err(err),
        None => Ok(outcome),
    }
}

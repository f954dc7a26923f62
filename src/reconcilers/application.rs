// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Application reconciler - drives the convergence engine from watch events.

use crate::config::Config;
use crate::constants::{crd::FINALIZER, labels, OPERATOR_NAME};
use crate::convergence::{Engine, Outcome};
use crate::error::{CraneError, Result};
use crate::kubernetes::KubeGateway;
use crate::types::{AppId, Application};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::{
    runtime::{
        controller::{self, Action},
        finalizer::{finalizer, Event},
        reflector::ObjectRef,
        watcher, Controller,
    },
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct ApplicationReconciler {
    client: Client,
    config: Config,
    engine: Engine<KubeGateway>,
    shutdown: CancellationToken,
}

impl ApplicationReconciler {
    /// `shutdown` is cancelled to abort in-flight cycles when the process stops
    pub fn new(client: Client, config: Config, shutdown: CancellationToken) -> Self {
        let engine = Engine::new(KubeGateway::new(client.clone()), config.reconcile_timeout);
        Self {
            client,
            config,
            engine,
            shutdown,
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>,
    {
        match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let applications: Api<Application> = self.api();
        let deployments: Api<Deployment> = self.api();
        let services: Api<Service> = self.api();
        let managed = watcher::Config::default()
            .labels(&format!("{}={}", labels::MANAGED_BY, OPERATOR_NAME));

        Controller::new(applications, watcher::Config::default())
            .watches(deployments, managed.clone(), application_ref::<Deployment>)
            .watches(services, managed, application_ref::<Service>)
            .shutdown_on_signal()
            .run(reconcile, error_policy, Arc::new(self))
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled application: {:?}", o),
                    // A managed object changed after its Application was finalized
                    Err(controller::Error::ObjectNotFound(obj_ref)) => {
                        debug!("Application {} no longer exists", obj_ref)
                    }
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("Application reconciler stopped");
        Ok(())
    }

    async fn apply(&self, id: &AppId) -> Result<Action> {
        let outcome = self
            .engine
            .reconcile(id, &self.shutdown.child_token())
            .await?;
        debug!("Applied application {}: {:?}", id, outcome);

        Ok(next_action(&self.config, &outcome))
    }

    /// Remove the managed objects; the finalizer is released only on success
    async fn cleanup(&self, id: &AppId) -> Result<Action> {
        let outcome = self
            .engine
            .cleanup(id, &self.shutdown.child_token())
            .await?;
        info!("Removed managed objects of application {}: {:?}", id, outcome);

        Ok(Action::await_change())
    }
}

async fn reconcile(app: Arc<Application>, ctx: Arc<ApplicationReconciler>) -> Result<Action> {
    let id = AppId::of(&app);
    debug!("Reconciling application: {}", id);

    let api: Api<Application> = Api::namespaced(ctx.client.clone(), &id.namespace);
    finalizer(&api, FINALIZER, app, |event| async move {
        match event {
            Event::Apply(_) => ctx.apply(&id).await,
            Event::Cleanup(_) => ctx.cleanup(&id).await,
        }
    })
    .await
    .map_err(|e| CraneError::Finalizer(Box::new(e)))
}

fn error_policy(
    _app: Arc<Application>,
    error: &CraneError,
    ctx: Arc<ApplicationReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    error_action(&ctx.config, error, ctx.shutdown.is_cancelled())
}

fn next_action(config: &Config, outcome: &Outcome) -> Action {
    match (outcome, config.resync_interval) {
        (Outcome::Applied(_), Some(interval)) => Action::requeue(interval),
        _ => Action::await_change(),
    }
}

fn error_action(config: &Config, error: &CraneError, shutting_down: bool) -> Action {
    if shutting_down && error.is_interrupted() {
        return Action::await_change();
    }
    Action::requeue(config.error_requeue)
}

/// Map a managed object back to the Application it was derived from
fn application_ref<K>(object: K) -> Option<ObjectRef<Application>>
where
    K: ResourceExt + Clone + DeserializeOwned + Debug,
{
    let id = AppId::from_managed(&object.namespace()?, &object.name_any())?;
    Some(ObjectRef::new(&id.name).within(&id.namespace))
}

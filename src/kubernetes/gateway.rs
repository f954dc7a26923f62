// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed CRUD access to Applications and the kinds they manage.

use crate::resources::ManagedKind;
use crate::types::Application;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use tracing::{debug, instrument};

/// Outcome of a delete that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    AlreadyAbsent,
}

/// Cluster access used by the convergence engine.
///
/// Not-found is never an error here: `get` returns `None` and `delete`
/// returns `Deletion::AlreadyAbsent`. Every other failure is passed through.
pub trait ClusterGateway: Send + Sync {
    fn get_application(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Application>, kube::Error>> + Send;

    fn get<K: ManagedKind>(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<K>, kube::Error>> + Send;

    fn create<K: ManagedKind>(
        &self,
        namespace: &str,
        object: &K,
    ) -> impl Future<Output = Result<K, kube::Error>> + Send;

    /// Full replace of the object; no patching
    fn update<K: ManagedKind>(
        &self,
        namespace: &str,
        object: &K,
    ) -> impl Future<Output = Result<K, kube::Error>> + Send;

    fn delete<K: ManagedKind>(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Deletion, kube::Error>> + Send;
}

/// Gateway backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub(crate) fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 404)
}

async fn get_opt<K>(api: Api<K>, name: &str) -> Result<Option<K>, kube::Error>
where
    K: Clone + DeserializeOwned + Debug,
{
    match api.get(name).await {
        Ok(object) => Ok(Some(object)),
        Err(err) if is_not_found(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

impl ClusterGateway for KubeGateway {
    #[instrument(skip(self))]
    async fn get_application(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Application>, kube::Error> {
        get_opt(Api::namespaced(self.client.clone(), namespace), name).await
    }

    #[instrument(skip(self), fields(kind = %K::kind_name()))]
    async fn get<K: ManagedKind>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, kube::Error> {
        get_opt(Api::<K>::namespaced(self.client.clone(), namespace), name).await
    }

    #[instrument(skip(self, object), fields(kind = %K::kind_name()))]
    async fn create<K: ManagedKind>(&self, namespace: &str, object: &K) -> Result<K, kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), object).await
    }

    #[instrument(skip(self, object), fields(kind = %K::kind_name()))]
    async fn update<K: ManagedKind>(&self, namespace: &str, object: &K) -> Result<K, kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let name = object.meta().name.clone().unwrap_or_default();
        api.replace(&name, &PostParams::default(), object).await
    }

    #[instrument(skip(self), fields(kind = %K::kind_name()))]
    async fn delete<K: ManagedKind>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);

        // Background propagation so a Deployment takes its ReplicaSets along
        match api.delete(name, &DeleteParams::background()).await {
            Ok(_) => Ok(Deletion::Deleted),
            Err(err) if is_not_found(&err) => {
                debug!("{} {}/{} already absent", K::kind_name(), namespace, name);
                Ok(Deletion::AlreadyAbsent)
            }
            Err(err) => Err(err),
        }
    }
}

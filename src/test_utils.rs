// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: an HTTP-level mock for `kube::Client` and an in-memory
//! cluster gateway that records every call.

use crate::error::Operation;
use crate::kubernetes::gateway::{ClusterGateway, Deletion};
use crate::resources::ManagedKind;
use crate::types::Application;
use http::{Request, Response};
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths
/// and records every (method, path) it receives.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));

        // Unmatched requests get a 404
        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("object", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A Status body as returned by the API server on failure
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// A `kube::Error` as the client would produce it for a failed request
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {}", reason),
        reason: reason.to_string(),
        code,
    })
}

/// One call made against the `FakeGateway`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Operation,
    pub kind: String,
    pub name: String,
}

#[derive(Default)]
struct FakeState {
    objects: HashMap<(String, String, String), serde_json::Value>,
    calls: Vec<Call>,
    failures: HashMap<(Operation, String), (u16, String)>,
    hang: bool,
}

/// In-memory cluster keyed by (kind, namespace, name).
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application(self, app: &Application) -> Self {
        self.put_application(app);
        self
    }

    pub fn put_application(&self, app: &Application) {
        let id = crate::types::AppId::of(app);
        self.insert("Application", &id.namespace, &id.name, serde_json::to_value(app).unwrap());
    }

    pub fn remove_application(&self, namespace: &str, name: &str) {
        self.state.lock().unwrap().objects.remove(&(
            "Application".to_string(),
            namespace.to_string(),
            name.to_string(),
        ));
    }

    pub fn put<K: ManagedKind>(&self, namespace: &str, object: &K) {
        let name = object.meta().name.clone().unwrap_or_default();
        self.insert(&K::kind_name(), namespace, &name, serde_json::to_value(object).unwrap());
    }

    pub fn object<K: ManagedKind>(&self, namespace: &str, name: &str) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(K::kind_name(), namespace.to_string(), name.to_string()))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// Make every `op` on `kind` fail with the given API status
    pub fn fail(self, op: Operation, kind: &str, code: u16, reason: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, kind.to_string()), (code, reason.to_string()));
        self
    }

    /// Never complete any call
    pub fn hanging(self) -> Self {
        self.state.lock().unwrap().hang = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, op: Operation) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    fn insert(&self, kind: &str, namespace: &str, name: &str, value: serde_json::Value) {
        self.state.lock().unwrap().objects.insert(
            (kind.to_string(), namespace.to_string(), name.to_string()),
            value,
        );
    }

    /// Record a call and report whether it should hang or fail
    fn record(&self, op: Operation, kind: &str, name: &str) -> (bool, Option<kube::Error>) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            op,
            kind: kind.to_string(),
            name: name.to_string(),
        });
        let failure = state
            .failures
            .get(&(op, kind.to_string()))
            .map(|(code, reason)| api_error(*code, reason));
        (state.hang, failure)
    }

    async fn enter(&self, op: Operation, kind: &str, name: &str) -> Result<(), kube::Error> {
        let (hang, failure) = self.record(op, kind, name);
        if hang {
            std::future::pending::<()>().await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn key(kind: String, namespace: &str, name: &str) -> (String, String, String) {
        (kind, namespace.to_string(), name.to_string())
    }
}

impl ClusterGateway for FakeGateway {
    async fn get_application(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Application>, kube::Error> {
        self.enter(Operation::Get, "Application", name).await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .objects
            .get(&Self::key("Application".to_string(), namespace, name))
            .map(|value| serde_json::from_value(value.clone()).unwrap()))
    }

    async fn get<K: ManagedKind>(&self, namespace: &str, name: &str) -> Result<Option<K>, kube::Error> {
        self.enter(Operation::Get, &K::kind_name(), name).await?;
        Ok(self.object(namespace, name))
    }

    async fn create<K: ManagedKind>(&self, namespace: &str, object: &K) -> Result<K, kube::Error> {
        let name = object.meta().name.clone().unwrap_or_default();
        self.enter(Operation::Create, &K::kind_name(), &name).await?;
        if self.object::<K>(namespace, &name).is_some() {
            return Err(api_error(409, "AlreadyExists"));
        }
        self.put(namespace, object);
        Ok(object.clone())
    }

    async fn update<K: ManagedKind>(&self, namespace: &str, object: &K) -> Result<K, kube::Error> {
        let name = object.meta().name.clone().unwrap_or_default();
        self.enter(Operation::Update, &K::kind_name(), &name).await?;
        if self.object::<K>(namespace, &name).is_none() {
            return Err(api_error(404, "NotFound"));
        }
        self.put(namespace, object);
        Ok(object.clone())
    }

    async fn delete<K: ManagedKind>(&self, namespace: &str, name: &str) -> Result<Deletion, kube::Error> {
        self.enter(Operation::Delete, &K::kind_name(), name).await?;
        let removed = self
            .state
            .lock()
            .unwrap()
            .objects
            .remove(&Self::key(K::kind_name(), namespace, name));
        Ok(match removed {
            Some(_) => Deletion::Deleted,
            None => Deletion::AlreadyAbsent,
        })
    }
}

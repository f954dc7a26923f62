// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Translation of an Application spec into the objects it manages.
//!
//! Everything here is a pure function of the Application: the same spec always
//! yields structurally identical objects, which is what lets the engine
//! overwrite live objects on every cycle without drifting.

pub mod claim;
pub mod deployment;
pub mod quantity;
pub mod service;

use crate::constants::{labels, OPERATOR_NAME};
use crate::types::Application;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ObjectMeta;
use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

pub use claim::storage_claim_for;
pub use deployment::deployment_for;
pub use service::service_for;

/// A namespaced object kind derived from, and owned by, an Application.
pub trait ManagedKind:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Build the desired object for the application
    fn desired(app: &Application) -> Self;

    /// Replace the spec-derived part of a live object with the desired one,
    /// leaving metadata (and with it the resourceVersion) untouched.
    fn overwrite_spec(live: &mut Self, desired: Self);

    fn kind_name() -> String {
        Self::kind(&()).into_owned()
    }
}

/// Selector labels shared by the Deployment's pods and the Service
pub(crate) fn selector_labels(app: &Application) -> BTreeMap<String, String> {
    BTreeMap::from([(labels::APP.to_string(), app.managed_name())])
}

/// Metadata for a derived object: deterministic name plus the managed-by label
pub(crate) fn managed_metadata(app: &Application) -> ObjectMeta {
    ObjectMeta {
        name: Some(app.managed_name()),
        labels: Some(BTreeMap::from([(
            labels::MANAGED_BY.to_string(),
            OPERATOR_NAME.to_string(),
        )])),
        ..Default::default()
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MANAGED_NAME_PREFIX;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "operator.cranom.tech", version = "v1", kind = "Application")]
#[kube(namespaced)]
pub struct ApplicationSpec {
    #[serde(rename = "app-name", default)]
    pub app_name: String,
    pub image: String,
    #[serde(default)]
    pub volumes: Vec<ApplicationVolume>,
    #[serde(default)]
    pub ports: Vec<ApplicationPortMap>,
    #[serde(rename = "envFrom", default)]
    pub env_from: String,
    #[serde(default)]
    pub resources: ApplicationResources,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ApplicationVolume {
    #[serde(rename = "volume-name")]
    pub volume_name: String,
    pub path: String,
}

/// A single port exposed by the application.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ApplicationPortMap {
    /// Port the container listens on
    pub internal: i32,
    /// Port exposed by the Service
    pub external: i32,
    /// Routing domain label, also used as the port name
    pub domain: String,
    /// Reserved for the external routing layer
    #[serde(rename = "SSL", default)]
    pub ssl: bool,
}

/// Resource hints. Only `storage` is consumed, by the claim translation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct ApplicationResources {
    /// Requested storage in bytes
    #[serde(default)]
    pub storage: i64,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub cpu: String,
}

impl Application {
    /// Name shared by every object derived from this application
    pub fn managed_name(&self) -> String {
        format!("{}{}", MANAGED_NAME_PREFIX, self.name_any())
    }
}

/// Identity of an application: the only key used to find its managed objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppId {
    pub namespace: String,
    pub name: String,
}

impl AppId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of(app: &Application) -> Self {
        Self::new(app.namespace().unwrap_or_default(), app.name_any())
    }

    pub fn managed_name(&self) -> String {
        format!("{}{}", MANAGED_NAME_PREFIX, self.name)
    }

    /// Reverse of `managed_name`, used to route managed-object events back to
    /// their application.
    pub fn from_managed(namespace: &str, managed_name: &str) -> Option<Self> {
        managed_name
            .strip_prefix(MANAGED_NAME_PREFIX)
            .filter(|name| !name.is_empty())
            .map(|name| Self::new(namespace, name))
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

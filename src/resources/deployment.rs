// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment derivation

use super::{managed_metadata, selector_labels, ManagedKind};
use crate::constants::CONTAINER_NAME;
use crate::types::Application;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvFromSource, PodSpec, PodTemplateSpec, SecretEnvSource,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

/// Build the single-container Deployment for an application.
///
/// Ports are copied as-is; duplicates are caught by validation, not here.
pub fn deployment_for(app: &Application) -> Deployment {
    let ports = app
        .spec
        .ports
        .iter()
        .map(|port| ContainerPort {
            name: Some(port.domain.clone()),
            container_port: port.internal,
            ..Default::default()
        })
        .collect();

    let env_from = vec![EnvFromSource {
        secret_ref: Some(SecretEnvSource {
            name: app.spec.env_from.clone(),
            optional: None,
        }),
        ..Default::default()
    }];

    Deployment {
        metadata: managed_metadata(app),
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(selector_labels(app)),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector_labels(app)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: CONTAINER_NAME.to_string(),
                        image: Some(app.spec.image.clone()),
                        ports: Some(ports),
                        env_from: Some(env_from),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl ManagedKind for Deployment {
    fn desired(app: &Application) -> Self {
        deployment_for(app)
    }

    fn overwrite_spec(live: &mut Self, desired: Self) {
        live.spec = desired.spec;
    }
}

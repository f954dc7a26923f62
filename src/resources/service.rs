// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service derivation

use super::{managed_metadata, selector_labels, ManagedKind};
use crate::types::Application;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Build the NodePort Service exposing every port mapping of an application.
pub fn service_for(app: &Application) -> Service {
    let ports = app
        .spec
        .ports
        .iter()
        .map(|port| ServicePort {
            name: Some(port.domain.clone()),
            port: port.external,
            target_port: Some(IntOrString::Int(port.internal)),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: managed_metadata(app),
        spec: Some(ServiceSpec {
            selector: Some(selector_labels(app)),
            ports: Some(ports),
            type_: Some("NodePort".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl ManagedKind for Service {
    fn desired(app: &Application) -> Self {
        service_for(app)
    }

    /// Cluster IPs and node ports are allocated by the API server, not derived
    /// from the application, so they survive the overwrite.
    fn overwrite_spec(live: &mut Self, desired: Self) {
        let Some(mut spec) = desired.spec else {
            live.spec = None;
            return;
        };

        if let Some(current) = live.spec.take() {
            spec.cluster_ip = current.cluster_ip;
            spec.cluster_ips = current.cluster_ips;
            spec.ip_families = current.ip_families;
            spec.ip_family_policy = current.ip_family_policy;

            let allocated = current.ports.unwrap_or_default();
            for port in spec.ports.iter_mut().flatten() {
                port.node_port = allocated
                    .iter()
                    .find(|p| p.name == port.name)
                    .and_then(|p| p.node_port);
            }
        }

        live.spec = Some(spec);
    }
}

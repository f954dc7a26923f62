// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fail-fast checks on an Application spec.
//!
//! The translator is total and will happily render any spec; these checks
//! catch what the API server would otherwise reject with a less helpful
//! message, before anything is written to the cluster.

use crate::resources::quantity::is_valid_quantity;
use crate::types::ApplicationSpec;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecViolation {
    #[error("image reference is empty")]
    EmptyImage,

    #[error("envFrom secret name is empty")]
    EmptyEnvFrom,

    #[error("{field} port {port} is outside 1-65535")]
    PortOutOfRange { field: &'static str, port: i32 },

    #[error("port name {0:?} is used more than once")]
    DuplicatePortName(String),

    #[error("{field} port {port} is used more than once")]
    DuplicatePort { field: &'static str, port: i32 },

    #[error("storage hint {0} is negative")]
    NegativeStorage(i64),

    #[error("{field} quantity {value:?} is malformed")]
    MalformedQuantity { field: &'static str, value: String },
}

/// Check every invariant of a spec, reporting the first violation found.
pub fn validate(spec: &ApplicationSpec) -> Result<(), SpecViolation> {
    if spec.image.trim().is_empty() {
        return Err(SpecViolation::EmptyImage);
    }
    if spec.env_from.trim().is_empty() {
        return Err(SpecViolation::EmptyEnvFrom);
    }

    let mut names = HashSet::new();
    let mut internal = HashSet::new();
    let mut external = HashSet::new();
    for port in &spec.ports {
        check_range("internal", port.internal)?;
        check_range("external", port.external)?;

        if !names.insert(port.domain.as_str()) {
            return Err(SpecViolation::DuplicatePortName(port.domain.clone()));
        }
        if !internal.insert(port.internal) {
            return Err(SpecViolation::DuplicatePort {
                field: "internal",
                port: port.internal,
            });
        }
        if !external.insert(port.external) {
            return Err(SpecViolation::DuplicatePort {
                field: "external",
                port: port.external,
            });
        }
    }

    let resources = &spec.resources;
    if resources.storage < 0 {
        return Err(SpecViolation::NegativeStorage(resources.storage));
    }
    check_quantity("memory", &resources.memory)?;
    check_quantity("cpu", &resources.cpu)?;

    Ok(())
}

fn check_range(field: &'static str, port: i32) -> Result<(), SpecViolation> {
    if (1..=65535).contains(&port) {
        Ok(())
    } else {
        Err(SpecViolation::PortOutOfRange { field, port })
    }
}

// Empty hints are allowed; they are optional.
fn check_quantity(field: &'static str, value: &str) -> Result<(), SpecViolation> {
    if value.is_empty() || is_valid_quantity(value) {
        Ok(())
    } else {
        Err(SpecViolation::MalformedQuantity {
            field,
            value: value.to_string(),
        })
    }
}

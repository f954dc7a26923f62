// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::validation::SpecViolation;
use kube::runtime::finalizer;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// API operation attempted on a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

#[derive(Error, Debug)]
pub enum CraneError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to {op} {kind} {object}: {source}")]
    ApiError {
        op: Operation,
        kind: String,
        object: String,
        #[source]
        source: kube::Error,
    },

    #[error("Invalid application {application}: {source}")]
    InvalidSpec {
        application: String,
        #[source]
        source: SpecViolation,
    },

    #[error("{} operations failed: {}", .0.len(), join(.0))]
    Multiple(Vec<CraneError>),

    #[error("Reconcile of {application} cancelled")]
    Cancelled { application: String },

    #[error("Reconcile of {application} exceeded deadline of {timeout:?}")]
    DeadlineExceeded {
        application: String,
        timeout: Duration,
    },

    #[error("Finalizer error: {0}")]
    Finalizer(#[source] Box<finalizer::Error<CraneError>>),
}

impl CraneError {
    pub fn api(
        op: Operation,
        kind: impl Into<String>,
        object: impl fmt::Display,
        source: kube::Error,
    ) -> Self {
        CraneError::ApiError {
            op,
            kind: kind.into(),
            object: object.to_string(),
            source,
        }
    }

    /// True when the cycle stopped before completing rather than failing
    pub fn is_interrupted(&self) -> bool {
        match self {
            CraneError::Cancelled { .. } | CraneError::DeadlineExceeded { .. } => true,
            CraneError::Finalizer(err) => match err.as_ref() {
                finalizer::Error::ApplyFailed(inner) | finalizer::Error::CleanupFailed(inner) => {
                    inner.is_interrupted()
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Fold per-kind failures into one error, or none
    pub fn collect(mut failures: Vec<CraneError>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(CraneError::Multiple(failures)),
        }
    }
}

fn join(errors: &[CraneError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CraneError>;

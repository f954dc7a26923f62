// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and typed cluster access.

pub mod crd;
pub mod gateway;

pub use crd::wait_for_application_crd;
pub use gateway::{ClusterGateway, Deletion, KubeGateway};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Prefix of every object name derived from an Application
pub const MANAGED_NAME_PREFIX: &str = "application-";

/// Name of the single container in the derived pod template
pub const CONTAINER_NAME: &str = "application";

/// The operator name, used as the managed-by label value
pub const OPERATOR_NAME: &str = "crane-operator";

/// Kubernetes label keys used by the operator
pub mod labels {
    /// Selector label binding the Service and Deployment to their pods
    pub const APP: &str = "app";
    /// Marks objects derived from an Application
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
}

/// Application CRD coordinates and polling configuration
pub mod crd {
    pub const GROUP: &str = "operator.cranom.tech";
    pub const VERSION: &str = "v1";
    pub const KIND: &str = "Application";
    /// Held on every Application until its managed objects are deleted
    pub const FINALIZER: &str = "operator.cranom.tech/cleanup";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Storage claim derivation.
//!
//! Reserved: the engine does not provision or mount this claim yet.

use super::{managed_metadata, quantity::binary_si};
use crate::types::Application;
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use std::collections::BTreeMap;

/// Build a ReadWriteOnce claim sized to the application's storage hint
pub fn storage_claim_for(app: &Application) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: managed_metadata(app),
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    binary_si(app.spec.resources.storage),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fixtures::make_app;

    #[test]
    fn test_storage_claim_sized_to_hint() {
        let mut app = make_app("foo", "ns", "nginx:latest");
        app.spec.resources.storage = 10 * 1024 * 1024 * 1024;

        let claim = storage_claim_for(&app);
        let spec = claim.spec.unwrap();

        assert_eq!(claim.metadata.name.as_deref(), Some("application-foo"));
        assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
        let requests = spec.resources.unwrap().requests.unwrap();
        assert_eq!(requests.get("storage").unwrap().0, "10Gi");
    }
}

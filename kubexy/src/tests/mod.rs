mod server_test;

use kx_core::prelude::*;
use rstest::*;

use super::*;

#[fixture]
pub fn registry() -> PodRegistry {
    let registry = PodRegistry::new();
    let pod = PodRecord {
        name: "web-1".into(),
        namespace: "shop".into(),
        node: "node-a".into(),
        owner_kind: "ReplicaSet".into(),
        status: PodStatus::Running,
        size: 12,
        replica: None,
    };
    registry.upsert(pod.key(), pod);
    registry
}

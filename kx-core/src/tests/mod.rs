mod simulator_test;

use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::*;

use crate::prelude::*;

pub const TEST_SEED: u64 = 0x6b756265;
pub const TEST_STEP: Duration = Duration::from_millis(100);

#[fixture]
pub fn registry() -> PodRegistry {
    PodRegistry::new()
}

#[fixture]
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(TEST_SEED)
}

#[fixture]
pub fn demo_config() -> DemoConfig {
    DemoConfig { pods: 15, nodes: 6, namespaces: 5, step_delay: TEST_STEP }
}

pub fn test_record(namespace: &str, name: &str, status: PodStatus) -> PodRecord {
    PodRecord {
        name: name.into(),
        namespace: namespace.into(),
        node: "node-1".into(),
        owner_kind: "ReplicaSet".into(),
        status,
        size: 4,
        replica: None,
    }
}

/// Insert running replicas of `prefix` at the given sequence numbers.
pub fn add_replicas(registry: &PodRegistry, namespace: &str, prefix: &ReplicaPrefix, seqs: &[usize]) {
    for &seq in seqs {
        let pod = PodRecord::for_replica(prefix.slot(seq), namespace, "node-1", "StatefulSet", 7, PodStatus::Running);
        registry.upsert(pod.key(), pod);
    }
}

pub fn test_pod(namespace: &str, name: &str, phase: &str, node: Option<&str>) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        },
        spec: Some(corev1::PodSpec {
            node_name: node.map(Into::into),
            containers: vec![corev1::Container { name: "main".into(), ..Default::default() }],
            ..Default::default()
        }),
        status: Some(corev1::PodStatus {
            phase: Some(phase.into()),
            container_statuses: Some(vec![corev1::ContainerStatus {
                name: "main".into(),
                ready: phase == "Running",
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

pub fn resources(cpu: &str, memory: &str) -> Option<BTreeMap<String, Quantity>> {
    Some(BTreeMap::from([
        ("cpu".into(), Quantity(cpu.into())),
        ("memory".into(), Quantity(memory.into())),
    ]))
}

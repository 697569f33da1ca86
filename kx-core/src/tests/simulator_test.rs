use std::collections::{
    BTreeMap,
    HashSet,
};

use assertables::*;

use super::*;
use crate::pod::{
    START_SEQUENCE,
    STOP_SEQUENCE,
};
use crate::simulator::{
    SimulationError,
    Simulator,
    OWNER_KINDS,
};

type TestSimulator = Simulator<RandomNameGenerator>;

fn simulator(registry: &PodRegistry, config: DemoConfig, mut rng: StdRng) -> TestSimulator {
    let namer = RandomNameGenerator::new(&mut rng);
    Simulator::new(registry.clone(), config, namer, rng).unwrap()
}

fn replicas_of(snapshot: &BTreeMap<PodKey, PodRecord>, namespace: &str, base: &str) -> Vec<PodRecord> {
    snapshot
        .values()
        .filter(|pod| pod.namespace == namespace)
        .filter(|pod| pod.replica.as_ref().is_some_and(|slot| slot.prefix.base == base))
        .cloned()
        .collect()
}

fn status_of(registry: &PodRegistry, key: &PodKey) -> Option<PodStatus> {
    registry.get(key).map(|pod| pod.status)
}

#[rstest]
fn test_generate(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let mut sim = simulator(&registry, demo_config, rng);
    sim.generate();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 15);

    let mut namespaces = HashSet::new();
    let mut nodes = HashSet::new();
    for (key, pod) in &snapshot {
        assert_eq!(*key, pod.key());
        assert_eq!(pod.status, PodStatus::Running);
        assert!(!pod.node.is_empty());
        assert!(!pod.namespace.is_empty());
        assert!(OWNER_KINDS.contains(&pod.owner_kind.as_str()));
        assert_lt!(pod.size, 100);

        let slot = pod.replica.as_ref().unwrap();
        assert_eq!(pod.name, slot.pod_name());
        namespaces.insert(pod.namespace.clone());
        nodes.insert(pod.node.clone());
    }
    assert_le!(namespaces.len(), 5);
    assert_le!(nodes.len(), 6);
}

#[rstest]
fn test_generate_replica_sets_are_contiguous(registry: PodRegistry, rng: StdRng) {
    let config = DemoConfig { pods: 40, nodes: 8, namespaces: 2, step_delay: TEST_STEP };
    let mut sim = simulator(&registry, config, rng);
    sim.generate();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 40);

    let mut sets: BTreeMap<String, Vec<PodRecord>> = BTreeMap::new();
    for pod in snapshot.values() {
        let prefix = pod.replica.as_ref().unwrap().prefix.to_string();
        sets.entry(format!("{}/{prefix}", pod.namespace)).or_default().push(pod.clone());
    }
    for pods in sets.values() {
        // a set never has more replicas than 3/4 of the nodes
        assert_le!(pods.len(), 6);
        let mut seqs: Vec<_> = pods.iter().map(|pod| pod.replica.as_ref().unwrap().seq).collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (0..pods.len()).collect::<Vec<_>>());
        assert!(pods.iter().all(|pod| pod.owner_kind == pods[0].owner_kind && pod.size == pods[0].size));
    }
}

#[rstest]
fn test_generate_is_reproducible(demo_config: DemoConfig) {
    let first = PodRegistry::new();
    let second = PodRegistry::new();
    simulator(&first, demo_config.clone(), StdRng::seed_from_u64(99)).generate();
    simulator(&second, demo_config, StdRng::seed_from_u64(99)).generate();

    assert_eq!(first.snapshot(), second.snapshot());
}

#[rstest]
fn test_invalid_config(registry: PodRegistry, rng: StdRng) {
    let config = DemoConfig { pods: 3, nodes: 0, namespaces: 1, step_delay: TEST_STEP };
    let namer = RandomNameGenerator::new(&mut StdRng::seed_from_u64(1));
    assert!(Simulator::new(registry, config, namer, rng).is_err());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_transition_to_completed_removes_pod(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let sim = simulator(&registry, demo_config, rng);
    let pod = test_record("ns", "a", PodStatus::Running);
    registry.upsert(pod.key(), pod.clone());

    sim.transition(&pod, STOP_SEQUENCE).await;
    assert_eq!(registry.get(&pod.key()), None);

    sim.transition(&pod, START_SEQUENCE).await;
    assert_eq!(status_of(&registry, &pod.key()), Some(PodStatus::Running));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_crash_container_steps(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let prefix = ReplicaPrefix::new("otter", 0xbeef);
    add_replicas(&registry, "ns", &prefix, &[0, 1]);
    registry.upsert(PodKey::new("ns", "other"), test_record("ns", "other", PodStatus::Running));
    let untouched: Vec<_> = registry.snapshot().into_iter().filter(|(k, _)| k.name != "otter-beef-0").collect();

    let key = prefix.key("ns", 0);
    let mut sim = simulator(&registry, demo_config, rng);
    let handle = {
        let key = key.clone();
        tokio::spawn(async move { sim.crash_container(&key).await })
    };

    let mut observed = vec![];
    for _ in 0..3 {
        tokio::time::sleep(TEST_STEP / 2).await;
        observed.push(status_of(&registry, &key).unwrap());
        for (other_key, other) in &untouched {
            assert_eq!(registry.get(other_key).as_ref(), Some(other));
        }
        tokio::time::sleep(TEST_STEP / 2).await;
    }
    handle.await.unwrap().unwrap();

    assert_eq!(observed, vec![PodStatus::Crash, PodStatus::Starting, PodStatus::Running]);
    assert_eq!(status_of(&registry, &key), Some(PodStatus::Running));
    assert_eq!(registry.len(), 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_rolling_update_conserves_replicas(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let prefix = ReplicaPrefix::new("heron", 0x1234);
    add_replicas(&registry, "ns", &prefix, &[0, 1, 2]);
    add_replicas(&registry, "ns", &ReplicaPrefix::new("lynx", 0x42), &[0]);

    let mut sim = simulator(&registry, demo_config, rng);
    let key = prefix.key("ns", 1);
    let handle = tokio::spawn(async move { sim.rolling_update(&key).await });

    let mut samples = 0;
    while !handle.is_finished() {
        let snapshot = registry.snapshot();
        assert_ge!(replicas_of(&snapshot, "ns", "heron").len(), 3);
        assert_eq!(replicas_of(&snapshot, "ns", "lynx").len(), 1);
        samples += 1;
        tokio::time::sleep(TEST_STEP / 10).await;
    }
    handle.await.unwrap().unwrap();
    assert_gt!(samples, 100);

    let heron = replicas_of(&registry.snapshot(), "ns", "heron");
    assert_eq!(heron.len(), 3);
    let new_prefix = &heron[0].replica.as_ref().unwrap().prefix;
    assert_ne!(new_prefix, &prefix);
    for pod in &heron {
        assert_eq!(pod.status, PodStatus::Running);
        assert_eq!(&pod.replica.as_ref().unwrap().prefix, new_prefix);
        assert_eq!(pod.owner_kind, "StatefulSet");
        assert_eq!(pod.size, 7);
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_recreate_full_cycle(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let prefix = ReplicaPrefix::new("koala", 0x77);
    add_replicas(&registry, "ns", &prefix, &[0, 1, 2, 3]);

    let mut sim = simulator(&registry, demo_config, rng);
    let key = prefix.key("ns", 2);
    let handle = tokio::spawn(async move { sim.recreate(&key).await });

    // old replicas are all gone before any new one shows up
    let mut saw_empty = false;
    while !handle.is_finished() {
        let pods = replicas_of(&registry.snapshot(), "ns", "koala");
        let old = pods.iter().filter(|pod| pod.replica.as_ref().unwrap().prefix == prefix).count();
        let new = pods.len() - old;
        assert!(old == 0 || new == 0);
        saw_empty |= pods.is_empty();
        tokio::time::sleep(TEST_STEP / 10).await;
    }
    handle.await.unwrap().unwrap();
    assert!(saw_empty);

    let koala = replicas_of(&registry.snapshot(), "ns", "koala");
    assert_eq!(koala.len(), 4);
    assert!(koala.iter().all(|pod| pod.status == PodStatus::Running));
    assert!(koala.iter().all(|pod| pod.replica.as_ref().unwrap().prefix != prefix));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_recreate_stops_counting_at_gap(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let prefix = ReplicaPrefix::new("yak", 0x5);
    add_replicas(&registry, "ns", &prefix, &[0, 1, 3]);

    let mut sim = simulator(&registry, demo_config, rng);
    sim.recreate(&prefix.key("ns", 0)).await.unwrap();

    let yak = replicas_of(&registry.snapshot(), "ns", "yak");
    let (old, new): (Vec<_>, Vec<_>) =
        yak.into_iter().partition(|pod| pod.replica.as_ref().unwrap().prefix == prefix);
    assert_eq!(old.len(), 1);
    assert_eq!(old[0].replica.as_ref().unwrap().seq, 3);
    assert_eq!(new.len(), 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_orchestration_skips_foreign_pods(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let pod = test_record("ns", "hand-made", PodStatus::Running);
    registry.upsert(pod.key(), pod.clone());
    let mut sim = simulator(&registry, demo_config, rng);

    let err = sim.rolling_update(&pod.key()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<SimulationError>(), Some(SimulationError::NotAReplica(_))));
    let err = sim.recreate(&pod.key()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<SimulationError>(), Some(SimulationError::NotAReplica(_))));

    let err = sim.recreate(&PodKey::new("ns", "gone")).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<SimulationError>(), Some(SimulationError::PodMissing(_))));

    assert_eq!(registry.snapshot(), BTreeMap::from([(pod.key(), pod)]));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_step_on_empty_registry(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let mut sim = simulator(&registry, demo_config, rng);
    for _ in 0..10 {
        sim.step().await.unwrap();
    }
    assert!(registry.is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_run_keeps_workload_alive(registry: PodRegistry, demo_config: DemoConfig, rng: StdRng) {
    let mut sim = simulator(&registry, demo_config, rng);
    sim.start().await.unwrap();
    let handle = tokio::spawn(async move { sim.run().await });

    for _ in 0..200 {
        tokio::time::sleep(TEST_STEP * 3).await;
        for (key, pod) in registry.snapshot() {
            assert_eq!(key, pod.key());
            assert_ne!(pod.status, PodStatus::Completed);
            assert!(pod.replica.is_some());
        }
    }
    assert!(!handle.is_finished());
    assert!(!registry.is_empty());
    handle.abort();
}

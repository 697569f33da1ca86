//! Synthetic cluster churn for demo mode.
//!
//! The simulator owns no state besides its configuration, its naming service and its random source;
//! everything it knows about the workload it reads back from the [`PodRegistry`].  Every operation is
//! a series of status steps, and each step is a single registry write followed by `step_delay` of
//! sleep, so concurrent readers observe every intermediate state.
mod ops;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::*;

use crate::config::DemoConfig;
use crate::err_impl;
use crate::errors::EmptyResult;
use crate::feeder::PodFeeder;
use crate::naming::NameGenerator;
use crate::pod::{
    PodKey,
    PodRecord,
    PodStatus,
    ReplicaPrefix,
};
use crate::registry::PodRegistry;

pub const OWNER_KINDS: [&str; 3] = ["StatefulSet", "ReplicaSet", "DaemonSet"];

err_impl! {SimulationError,
    #[error("pod {0} was not generated by the simulator")]
    NotAReplica(PodKey),

    #[error("pod {0} is no longer in the registry")]
    PodMissing(PodKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CrashContainer,
    RollingUpdate,
    Recreate,
}

impl Operation {
    const ALL: [Operation; 3] = [Operation::CrashContainer, Operation::RollingUpdate, Operation::Recreate];
}

pub struct Simulator<N> {
    registry: PodRegistry,
    config: DemoConfig,
    namer: N,
    rng: StdRng,
}

impl<N: NameGenerator> Simulator<N> {
    pub fn new(registry: PodRegistry, config: DemoConfig, namer: N, rng: StdRng) -> anyhow::Result<Simulator<N>> {
        config.validate()?;
        Ok(Simulator { registry, config, namer, rng })
    }

    pub fn registry(&self) -> &PodRegistry {
        &self.registry
    }

    /// Fill the registry with `config.pods` running pods, grouped into replica sets of random size
    /// and kind.  The last set is cut short so the total comes out exact.
    #[instrument(skip(self), fields(pods = self.config.pods))]
    pub fn generate(&mut self) {
        let max_replicas = (self.config.nodes * 3 / 4).max(1);

        let mut generated = 0;
        while generated < self.config.pods {
            let max_replicas = max_replicas.min(self.config.pods - generated);
            let owner_kind = OWNER_KINDS[self.rng.gen_range(0..OWNER_KINDS.len())];
            let namespace_id = self.rng.gen_range(0..self.config.namespaces);
            let namespace = self.namer.namespace_name(&namespace_id.to_string());
            let replicas = 1 + self.rng.gen_range(0..max_replicas);
            let size = self.rng.gen_range(0..90) / replicas as u64 + self.rng.gen_range(0..10);

            let base = self.namer.pod_name(&generated.to_string());
            let prefix = ReplicaPrefix::new(&base, self.rng.gen());

            for seq in 0..replicas {
                let node = self.random_node();
                let pod =
                    PodRecord::for_replica(prefix.slot(seq), &namespace, &node, owner_kind, size, PodStatus::Running);
                debug!("generated pod {pod:?}");
                self.registry.upsert(pod.key(), pod);
                generated += 1;
            }
        }
        info!("generated {generated} pods");
    }

    /// Run one randomly chosen operation against one randomly chosen pod.  Does nothing if the
    /// registry is empty.
    pub async fn step(&mut self) -> EmptyResult {
        let operation = Operation::ALL[self.rng.gen_range(0..Operation::ALL.len())];
        let Some(key) = self.random_pod() else {
            debug!("registry is empty, nothing to simulate");
            return Ok(());
        };

        info!("simulating {operation:?} on {key}");
        match operation {
            Operation::CrashContainer => self.crash_container(&key).await,
            Operation::RollingUpdate => self.rolling_update(&key).await,
            Operation::Recreate => self.recreate(&key).await,
        }
    }

    fn random_pod(&mut self) -> Option<PodKey> {
        self.registry.keys().choose(&mut self.rng).cloned()
    }

    fn random_node(&mut self) -> String {
        let node_id = self.rng.gen_range(0..self.config.nodes);
        self.namer.node_name(&node_id.to_string())
    }

    /// Pick a revision for the next generation of a replica set, distinct from the current one.
    fn next_prefix(&mut self, prefix: &ReplicaPrefix) -> ReplicaPrefix {
        loop {
            let revision = self.rng.gen();
            if revision != prefix.revision {
                return ReplicaPrefix::new(&prefix.base, revision);
            }
        }
    }
}

#[async_trait]
impl<N: NameGenerator> PodFeeder for Simulator<N> {
    fn name(&self) -> &'static str {
        "simulator"
    }

    async fn start(&mut self) -> EmptyResult {
        self.generate();
        Ok(())
    }

    async fn run(&mut self) -> EmptyResult {
        loop {
            tokio::time::sleep(self.config.step_delay).await;
            if let Err(err) = self.step().await {
                error!("skipping simulation step: {err:#}");
            }
        }
    }
}

use tracing::*;

use super::{
    SimulationError,
    Simulator,
};
use crate::errors::EmptyResult;
use crate::naming::NameGenerator;
use crate::pod::{
    PodKey,
    PodRecord,
    PodStatus,
    ReplicaPrefix,
    ReplicaSlot,
    CRASH_SEQUENCE,
    START_SEQUENCE,
    STOP_SEQUENCE,
};

impl<N: NameGenerator> Simulator<N> {
    /// Walk `pod` through `sequence`, one registry write per status with `step_delay` in between.
    /// Reaching `Completed` removes the pod instead of storing it.
    pub async fn transition(&self, pod: &PodRecord, sequence: &[PodStatus]) {
        let key = pod.key();
        for &status in sequence {
            if status.is_terminal() {
                self.registry.remove(&key);
                debug!("pod {key} completed and removed");
            } else {
                self.registry.upsert(key.clone(), pod.with_status(status));
                debug!("pod {key} is now {status:?}");
            }
            tokio::time::sleep(self.config.step_delay).await;
        }
    }

    /// Crash one container of the pod and let it come back.
    #[instrument(skip(self))]
    pub async fn crash_container(&mut self, key: &PodKey) -> EmptyResult {
        let Some(pod) = self.registry.get(key) else {
            warn!("pod {key} disappeared before it could crash");
            return Ok(());
        };
        self.transition(&pod, CRASH_SEQUENCE).await;
        Ok(())
    }

    /// Replace the replica set of the given pod one replica at a time: each new replica is fully
    /// started before its predecessor is stopped.
    #[instrument(skip(self))]
    pub async fn rolling_update(&mut self, key: &PodKey) -> EmptyResult {
        let (namespace, old_prefix) = self.replica_set_of(key)?;
        let new_prefix = self.next_prefix(&old_prefix);
        info!("rolling update {namespace}/{old_prefix} -> {new_prefix}");

        let mut seq = 0;
        while let Some(old_pod) = self.registry.get(&old_prefix.key(&namespace, seq)) {
            let new_pod = self.respawn(new_prefix.slot(seq), &old_pod);
            self.transition(&new_pod, START_SEQUENCE).await;
            self.transition(&old_pod, STOP_SEQUENCE).await;
            seq += 1;
        }
        Ok(())
    }

    /// Tear down the whole replica set of the given pod, then bring up the same number of replicas
    /// under a new revision.
    ///
    /// The replica count is the number of consecutive sequence numbers present starting at zero, so
    /// a set with a gap in its numbering comes back smaller.
    #[instrument(skip(self))]
    pub async fn recreate(&mut self, key: &PodKey) -> EmptyResult {
        let (namespace, old_prefix) = self.replica_set_of(key)?;
        let new_prefix = self.next_prefix(&old_prefix);
        info!("recreate {namespace}/{old_prefix} -> {new_prefix}");

        let mut replicas = 0;
        let mut template = None;
        for &status in STOP_SEQUENCE {
            let mut seq = 0;
            while let Some(old_pod) = self.registry.get(&old_prefix.key(&namespace, seq)) {
                self.transition(&old_pod, &[status]).await;
                template = Some(old_pod);
                seq += 1;
            }
            replicas = seq;
        }

        let Some(template) = template else {
            warn!("replica set {namespace}/{old_prefix} vanished before it could be recreated");
            return Ok(());
        };

        for &status in START_SEQUENCE {
            for seq in 0..replicas {
                let new_pod = match self.registry.get(&new_prefix.key(&namespace, seq)) {
                    Some(pod) => pod,
                    None => self.respawn(new_prefix.slot(seq), &template),
                };
                self.transition(&new_pod, &[status]).await;
            }
        }
        Ok(())
    }

    fn replica_set_of(&self, key: &PodKey) -> anyhow::Result<(String, ReplicaPrefix)> {
        let pod = self.registry.get(key).ok_or_else(|| SimulationError::pod_missing(key.clone()))?;
        let slot = pod.replica.ok_or_else(|| SimulationError::not_a_replica(key.clone()))?;
        Ok((key.namespace.clone(), slot.prefix))
    }

    /// A fresh, unscheduled copy of `template` in `slot`, placed on a random node.
    fn respawn(&mut self, slot: ReplicaSlot, template: &PodRecord) -> PodRecord {
        let node = self.random_node();
        PodRecord::for_replica(slot, &template.namespace, &node, &template.owner_kind, template.size, PodStatus::Init)
    }
}

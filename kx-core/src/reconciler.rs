//! Keeps the registry in sync with the pods reported by the cluster API.
use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::time::{
    self,
    MissedTickBehavior,
};
use tracing::*;

use crate::config::ReconcilerConfig;
use crate::errors::EmptyResult;
use crate::feeder::PodFeeder;
use crate::k8s::{
    self,
    PodLister,
};
use crate::naming::{
    NameGenerator,
    RawNames,
};
use crate::pod::{
    PodKey,
    PodRecord,
};
use crate::prelude::corev1;
use crate::registry::PodRegistry;

/// Writes applied to the registry by a single reconcile cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconcileStats {
    pub fn writes(&self) -> usize {
        self.added + self.updated + self.deleted
    }
}

pub struct Reconciler<L> {
    registry: PodRegistry,
    lister: L,
    config: ReconcilerConfig,
    anonymizer: Option<Box<dyn NameGenerator>>,
}

impl<L: PodLister> Reconciler<L> {
    pub fn new(registry: PodRegistry, lister: L, config: ReconcilerConfig) -> Reconciler<L> {
        Reconciler { registry, lister, config, anonymizer: None }
    }

    /// Route every name through `namer` before it reaches the registry.
    pub fn with_anonymizer(mut self, namer: Box<dyn NameGenerator>) -> Reconciler<L> {
        self.anonymizer = Some(namer);
        self
    }

    /// Pull the full pod list once and diff it into the registry.  If the pull fails the registry is
    /// left untouched.
    #[instrument(skip(self))]
    pub async fn reconcile(&mut self) -> anyhow::Result<ReconcileStats> {
        let mut stale: BTreeSet<PodKey> = self.registry.keys().into_iter().collect();
        let pods = self.lister.list_pods().await?;

        let mut stats = ReconcileStats::default();
        let mut live = RawNames::default();
        for pod in &pods {
            let record = self.to_record(pod, &mut live);
            let key = record.key();
            stale.remove(&key);

            // terminal pods are never stored; if we knew about it, the stale pass below removes it
            if record.status.is_terminal() {
                if self.registry.contains(&key) {
                    stale.insert(key);
                }
                continue;
            }

            match self.registry.get(&key) {
                None => {
                    info!("add pod {key}: {record:?}");
                    self.registry.upsert(key, record);
                    stats.added += 1;
                },
                Some(current) if current != record => {
                    info!("update pod {key}: {:?} -> {:?}", current.status, record.status);
                    self.registry.upsert(key, record);
                    stats.updated += 1;
                },
                Some(_) => (),
            }
        }

        for key in stale {
            if let Some(record) = self.registry.remove(&key) {
                info!("delete pod {key}: {record:?}");
                stats.deleted += 1;
            }
        }

        if let Some(namer) = self.anonymizer.as_mut() {
            namer.retain(&live);
        }

        debug!(?stats, upstream = pods.len(), "reconcile cycle finished");
        Ok(stats)
    }

    fn to_record(&mut self, pod: &corev1::Pod, live: &mut RawNames) -> PodRecord {
        let mut record = k8s::pod_record(pod);
        let Some(namer) = self.anonymizer.as_mut() else { return record };

        live.namespaces.insert(record.namespace.clone());
        record.namespace = namer.namespace_name(&record.namespace);

        // only the generateName prefix is renamed; the unique suffix is kept
        let generated = pod
            .metadata
            .generate_name
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .and_then(|prefix| {
                let suffix = record.name.strip_prefix(prefix).filter(|suffix| !suffix.is_empty())?;
                Some((prefix, suffix.to_string()))
            });
        match generated {
            Some((prefix, suffix)) => {
                live.pods.insert(prefix.into());
                record.name = format!("{}-{suffix}", namer.pod_name(prefix));
            },
            None => {
                live.pods.insert(record.name.clone());
                record.name = namer.pod_name(&record.name);
            },
        }

        if !record.node.is_empty() {
            live.nodes.insert(record.node.clone());
            record.node = namer.node_name(&record.node);
        }
        record
    }
}

#[async_trait]
impl<L: PodLister> PodFeeder for Reconciler<L> {
    fn name(&self) -> &'static str {
        "reconciler"
    }

    async fn start(&mut self) -> EmptyResult {
        let stats = self.reconcile().await?;
        info!("initial sync loaded {} pods", stats.added);
        Ok(())
    }

    // Cycles run back to back on this one task, so a slow list call delays the next cycle instead of
    // overlapping with it.
    async fn run(&mut self) -> EmptyResult {
        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(err) = self.reconcile().await {
                error!("could not refresh pod list, will retry in {:?}: {err:#}", self.config.interval);
            }
        }
    }
}

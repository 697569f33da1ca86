//! # kx-core – pod registry and feeders for `KubeXY`
//!
//! kx-core keeps a live, in-memory view of the pods in a cluster.  The view lives in a
//! [`PodRegistry`](crate::registry::PodRegistry), which is written by exactly one "feeder":
//!
//! 1. the [`Reconciler`](crate::reconciler::Reconciler) pulls the full pod list from the Kubernetes
//!    API on a fixed interval and diffs it into the registry, or
//! 2. the [`Simulator`](crate::simulator::Simulator) generates a synthetic workload and keeps
//!    crashing, rolling and recreating it, one observable status step at a time.
//!
//! Readers take consistent copies through the [`SnapshotExporter`](crate::export::SnapshotExporter).

pub mod config;
pub mod errors;
pub mod export;
pub mod feeder;
pub mod k8s;
pub mod logging;
pub mod naming;
pub mod pod;
pub mod reconciler;
pub mod registry;
pub mod simulator;

pub mod prelude {
    pub use k8s_openapi::api::core::v1 as corev1;
    pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

    pub use crate::config::{
        DemoConfig,
        ReconcilerConfig,
    };
    pub use crate::errors::EmptyResult;
    pub use crate::export::{
        PodSnapshot,
        SnapshotExporter,
        SnapshotSource,
    };
    pub use crate::feeder::PodFeeder;
    pub use crate::logging;
    pub use crate::naming::{
        NameGenerator,
        RandomNameGenerator,
        RawNames,
    };
    pub use crate::pod::{
        PodKey,
        PodRecord,
        PodStatus,
        ReplicaPrefix,
        ReplicaSlot,
    };
    pub use crate::registry::PodRegistry;
}

#[cfg(test)]
mod tests;

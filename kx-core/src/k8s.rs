//! Everything that touches Kubernetes types: listing pods and turning them into [`PodRecord`]s.
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::ListParams;
use kube::config::{
    KubeConfigOptions,
    Kubeconfig,
};
use kube::{
    Api,
    Client,
    Config,
};
use tracing::*;

use crate::pod::{
    PodRecord,
    PodStatus,
};
use crate::prelude::corev1;

pub const UNDEFINED_OWNER_KIND: &str = "undefined";

const POD_PHASE_PENDING: &str = "Pending";
const POD_PHASE_RUNNING: &str = "Running";
const POD_PHASE_SUCCEEDED: &str = "Succeeded";
const POD_PHASE_FAILED: &str = "Failed";
const POD_PHASE_UNKNOWN: &str = "Unknown";

// cpu is measured in millicores and memory in bytes; the product is scaled down to something that
// fits on screen
const SIZE_DIVISOR: u64 = 1000 * 1024 * 1024;

/// Source of the full, current set of pods in the cluster.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn list_pods(&self) -> anyhow::Result<Vec<corev1::Pod>>;
}

/// [`PodLister`] backed by the Kubernetes API, listing across all namespaces.
#[derive(Clone)]
pub struct KubePodLister {
    api: Api<corev1::Pod>,
}

impl KubePodLister {
    pub fn new(client: Client) -> KubePodLister {
        KubePodLister { api: Api::all(client) }
    }

    /// Build a client from an explicit kubeconfig file, or fall back to in-cluster/default config
    /// discovery when no path is given.
    pub async fn connect(kubeconfig: Option<&Path>) -> anyhow::Result<KubePodLister> {
        let config = match kubeconfig {
            Some(path) => {
                info!("loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
            },
            None => Config::infer().await?,
        };
        Ok(KubePodLister::new(Client::try_from(config)?))
    }
}

#[async_trait]
impl PodLister for KubePodLister {
    async fn list_pods(&self) -> anyhow::Result<Vec<corev1::Pod>> {
        Ok(self.api.list(&ListParams::default()).await?.items)
    }
}

/// Map a pod onto the viewer's status scale, based on its phase and container readiness.
pub fn pod_status(pod: &corev1::Pod) -> PodStatus {
    let node_assigned = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.node_name.as_deref())
        .is_some_and(|node| !node.is_empty());

    match pod.status.as_ref().and_then(|status| status.phase.as_deref()) {
        Some(POD_PHASE_FAILED | POD_PHASE_UNKNOWN) => return PodStatus::Error,
        Some(POD_PHASE_SUCCEEDED) => return PodStatus::Completed,
        Some(POD_PHASE_PENDING) if node_assigned => return PodStatus::Starting,
        Some(POD_PHASE_PENDING) => return PodStatus::Init,
        Some(POD_PHASE_RUNNING) => (),
        _ => return PodStatus::Error,
    }

    if pod.metadata.deletion_timestamp.is_some() {
        return PodStatus::Terminating;
    }

    let declared = pod.spec.as_ref().map_or(0, |spec| spec.containers.len());
    let mut ready = 0;
    let container_statuses = pod.status.as_ref().and_then(|status| status.container_statuses.as_deref());
    for container in container_statuses.unwrap_or_default() {
        if container.ready {
            ready += 1;
        } else if container.state.as_ref().is_some_and(|state| state.terminated.is_some()) {
            return PodStatus::Crash;
        }
    }

    if ready < declared {
        PodStatus::Starting
    } else {
        PodStatus::Running
    }
}

pub fn owner_kind(pod: &corev1::Pod) -> String {
    pod.metadata
        .owner_references
        .as_ref()
        .and_then(|owners| owners.first())
        .map_or_else(|| UNDEFINED_OWNER_KIND.into(), |owner| owner.kind.clone())
}

/// Cost metric for a pod: the sum over its containers of cpu millicores times memory bytes, taken
/// from requests or, when the requests product is zero, from limits.
pub fn pod_size(pod: &corev1::Pod) -> u64 {
    let Some(spec) = pod.spec.as_ref() else { return 0 };

    let total = spec.containers.iter().fold(0u64, |total, container| {
        let resources = container.resources.as_ref();
        let mut size = resource_product(resources.and_then(|r| r.requests.as_ref()));
        if size == 0 {
            size = resource_product(resources.and_then(|r| r.limits.as_ref()));
        }
        total.saturating_add(size)
    });
    total / SIZE_DIVISOR
}

fn resource_product(resources: Option<&BTreeMap<String, Quantity>>) -> u64 {
    let Some(resources) = resources else { return 0 };
    let quantity = |name: &str| resources.get(name).and_then(|q| parse_quantity(&q.0)).unwrap_or(0.0);

    let cpu_millis = round_up(quantity("cpu") * 1000.0);
    let memory = round_up(quantity("memory"));
    if cpu_millis <= 0.0 || memory <= 0.0 {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let product = (cpu_millis * memory).min(u64::MAX as f64) as u64;
    product
}

// Quantities round up to the next whole unit (0.4 millicores counts as 1); values that are integral up
// to float noise stay put.
fn round_up(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    }
}

/// Parse a Kubernetes resource quantity (`500m`, `1.5`, `128Mi`, `1e9`, ...) into base units.
/// Returns `None` for anything that does not follow the quantity grammar.
pub fn parse_quantity(quantity: &str) -> Option<f64> {
    let quantity = quantity.trim();
    let split = quantity
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(quantity.len());
    let (number, suffix) = quantity.split_at(split);
    let number: f64 = number.parse().ok()?;

    let multiplier = match suffix {
        "" => 1.0,
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        "Ei" => 1024f64.powi(6),
        exp if exp.starts_with(['e', 'E']) => 10f64.powi(exp[1..].parse().ok()?),
        _ => return None,
    };
    Some(number * multiplier)
}

/// Pure transform from a Kubernetes pod to the record the registry stores.
pub fn pod_record(pod: &corev1::Pod) -> PodRecord {
    PodRecord {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        node: pod.spec.as_ref().and_then(|spec| spec.node_name.clone()).unwrap_or_default(),
        owner_kind: owner_kind(pod),
        status: pod_status(pod),
        size: pod_size(pod),
        replica: None,
    }
}

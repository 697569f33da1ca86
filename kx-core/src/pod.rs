//! Data model for the pod view.
use std::fmt;

use serde::{
    de,
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};

/// Lifecycle status of a pod as shown to the viewer.  The numeric codes are part of the JSON
/// contract and must not be reordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PodStatus {
    /// Just created, not scheduled yet
    #[default]
    Init = 0,
    /// Scheduled, containers are starting
    Starting = 1,
    /// All containers are up and running
    Running = 2,
    /// One or more containers are down
    Crash = 3,
    Terminating = 4,
    /// Deleted, completed or evicted; never stored in the registry
    Completed = 5,
    Error = 6,
}

impl PodStatus {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, PodStatus::Completed)
    }
}

impl TryFrom<u8> for PodStatus {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(PodStatus::Init),
            1 => Ok(PodStatus::Starting),
            2 => Ok(PodStatus::Running),
            3 => Ok(PodStatus::Crash),
            4 => Ok(PodStatus::Terminating),
            5 => Ok(PodStatus::Completed),
            6 => Ok(PodStatus::Error),
            other => Err(other),
        }
    }
}

impl Serialize for PodStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for PodStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        PodStatus::try_from(code).map_err(|c| de::Error::custom(format!("unknown pod status code {c}")))
    }
}

pub const START_SEQUENCE: &[PodStatus] = &[PodStatus::Init, PodStatus::Starting, PodStatus::Running];
pub const STOP_SEQUENCE: &[PodStatus] = &[PodStatus::Terminating, PodStatus::Completed];
pub const CRASH_SEQUENCE: &[PodStatus] = &[PodStatus::Crash, PodStatus::Starting, PodStatus::Running];

/// Registry key; renders as `namespace/name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodKey {
    pub namespace: String,
    pub name: String,
}

impl PodKey {
    pub fn new(namespace: &str, name: &str) -> PodKey {
        PodKey { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for PodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The part of a generated pod name shared by every replica of one replica set: a base name plus a
/// revision that changes whenever the set is rolled or recreated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReplicaPrefix {
    pub base: String,
    pub revision: u16,
}

impl ReplicaPrefix {
    pub fn new(base: &str, revision: u16) -> ReplicaPrefix {
        ReplicaPrefix { base: base.into(), revision }
    }

    pub fn slot(&self, seq: usize) -> ReplicaSlot {
        ReplicaSlot { prefix: self.clone(), seq }
    }

    pub fn key(&self, namespace: &str, seq: usize) -> PodKey {
        PodKey::new(namespace, &self.slot(seq).pod_name())
    }
}

impl fmt::Display for ReplicaPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:x}", self.base, self.revision)
    }
}

/// Position of a generated pod inside its replica set.  Carried next to the record so the
/// simulator never has to parse pod names back apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReplicaSlot {
    pub prefix: ReplicaPrefix,
    pub seq: usize,
}

impl ReplicaSlot {
    pub fn pod_name(&self) -> String {
        format!("{}-{:x}", self.prefix, self.seq)
    }
}

/// One pod as the viewer sees it.  Records are only ever replaced as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub node: String,
    pub owner_kind: String,
    pub status: PodStatus,
    pub size: u64,

    #[serde(skip)]
    pub replica: Option<ReplicaSlot>,
}

impl PodRecord {
    /// Build a record for a simulator-owned pod; the name is derived from `slot`.
    pub fn for_replica(
        slot: ReplicaSlot,
        namespace: &str,
        node: &str,
        owner_kind: &str,
        size: u64,
        status: PodStatus,
    ) -> PodRecord {
        PodRecord {
            name: slot.pod_name(),
            namespace: namespace.into(),
            node: node.into(),
            owner_kind: owner_kind.into(),
            status,
            size,
            replica: Some(slot),
        }
    }

    pub fn key(&self) -> PodKey {
        PodKey::new(&self.namespace, &self.name)
    }

    pub fn with_status(&self, status: PodStatus) -> PodRecord {
        PodRecord { status, ..self.clone() }
    }
}

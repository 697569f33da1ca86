use std::collections::BTreeMap;

use serde::Serialize;
use tracing::*;

use crate::err_impl;
use crate::pod::PodRecord;
use crate::registry::PodRegistry;

err_impl! {ExportError,
    #[error("could not encode pod snapshot: {0}")]
    Encode(serde_json::Error),
}

/// Point-in-time copy of the registry, keyed by `namespace/name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PodSnapshot(pub BTreeMap<String, PodRecord>);

impl PodSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PodRecord> {
        self.0.get(key)
    }
}

/// Anything that can render the current pod view as JSON.
pub trait SnapshotSource: Send + Sync {
    fn export_json(&self) -> anyhow::Result<String>;
}

/// Read-only view of a [`PodRegistry`] for external consumers.
#[derive(Clone, Debug)]
pub struct SnapshotExporter {
    registry: PodRegistry,
}

impl SnapshotExporter {
    pub fn new(registry: PodRegistry) -> SnapshotExporter {
        SnapshotExporter { registry }
    }

    pub fn export(&self) -> PodSnapshot {
        PodSnapshot(
            self.registry
                .snapshot()
                .into_iter()
                .map(|(key, record)| (key.to_string(), record))
                .collect(),
        )
    }

    pub fn export_json(&self) -> anyhow::Result<String> {
        let snapshot = self.export();
        debug!(pods = snapshot.len(), "exporting pod snapshot");
        encode(&snapshot)
    }
}

impl SnapshotSource for SnapshotExporter {
    fn export_json(&self) -> anyhow::Result<String> {
        SnapshotExporter::export_json(self)
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).map_err(ExportError::encode)
}

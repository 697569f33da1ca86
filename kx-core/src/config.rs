//! Runtime settings for the two feeders.  How these are loaded (flags, files) is up to the binary.
use std::time::Duration;

use crate::errors::{
    ensure,
    EmptyResult,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shape and pace of the synthetic workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoConfig {
    pub pods: usize,
    pub nodes: usize,
    pub namespaces: usize,

    /// Pause between two status steps, and between two simulator operations.
    pub step_delay: Duration,
}

impl DemoConfig {
    /// The legacy `--demo-speed` knob counts in units of ten milliseconds.
    pub fn step_delay_from_speed(speed: u64) -> Duration {
        Duration::from_millis(speed.saturating_mul(10))
    }

    pub fn validate(&self) -> EmptyResult {
        ensure!(self.nodes > 0, "demo mode needs at least one node");
        ensure!(self.namespaces > 0, "demo mode needs at least one namespace");
        Ok(())
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            pods: 15,
            nodes: 6,
            namespaces: 5,
            step_delay: Self::step_delay_from_speed(500),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub interval: Duration,

    /// Replace namespace, node and pod names with generated ones before storing them.
    pub anonymize: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        ReconcilerConfig { interval: DEFAULT_POLL_INTERVAL, anonymize: false }
    }
}

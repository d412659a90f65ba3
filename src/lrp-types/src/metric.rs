//! Per-instance resource samples retrieved from the metrics service.

use serde::{Deserialize, Serialize};

use crate::ids::Index;

/// A single per-instance resource-usage sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetric {
    pub instance_index: Index,
    /// Raw percentage, 0-100 (not yet divided into a fraction).
    pub cpu_percentage: f64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
}

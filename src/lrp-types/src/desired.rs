//! The [`DesiredSpec`] record, the durable target for a process guid.

use serde::{Deserialize, Serialize};

use crate::ids::ProcessGuid;

/// The durable target state for a process guid. Owned by BBS; fields beyond
/// `instances` and `log_stream_guid` are opaque to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredSpec {
    pub process_guid: ProcessGuid,
    /// Target instance count.
    pub instances: u32,
    /// The identifier under which this process's container metrics are
    /// published on the metrics bus.
    pub log_stream_guid: String,
}

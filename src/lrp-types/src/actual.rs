//! The [`ActualInstance`] record, owned by BBS and never mutated by the
//! bridge.

use serde::{Deserialize, Serialize};

use crate::ids::{CellId, Index, InstanceGuid, ProcessGuid};

/// The lifecycle state of an observed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActualState {
    Unclaimed,
    Claimed,
    Running,
    Crashed,
}

/// Whether an instance is being drained from its cell for graceful
/// shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Ordinary,
    Evacuating,
}

/// A single container-port to host-port mapping advertised by an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
}

/// Host address plus port mappings for a placed, running instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetInfo {
    pub address: String,
    pub ports: Vec<PortMapping>,
}

impl NetInfo {
    /// Returns the host-side port whose container-side port equals
    /// `container_port`, or `0` if no such mapping exists.
    pub fn host_port_for(&self, container_port: u16) -> u16 {
        self.ports
            .iter()
            .find(|mapping| mapping.container_port == container_port)
            .map_or(0, |mapping| mapping.host_port)
    }
}

/// A record describing the observed state of a specific instance
/// incarnation. Owned by BBS; the bridge only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualInstance {
    pub process_guid: ProcessGuid,
    pub instance_guid: InstanceGuid,
    pub cell_id: CellId,
    pub index: Index,
    /// Only instances with `domain == CC_APP_DOMAIN` are acted upon.
    pub domain: String,
    pub state: ActualState,
    pub net_info: NetInfo,
    /// Wall-clock nanoseconds at which `state` was last entered.
    pub since: i64,
    /// Monotonically non-decreasing while `domain` is stable.
    pub crash_count: u32,
    /// Set when `state == Crashed`.
    pub crash_reason: Option<String>,
    /// Non-empty only when placement failed; surfaced via
    /// `LRPInstanceView::details` when `state == Crashed`.
    pub placement_error: Option<String>,
    pub presence: Presence,
    /// Three-valued: `None` (unset), `Some(false)`, `Some(true)`.
    pub routable: Option<bool>,
}

impl ActualInstance {
    /// Whether the bridge should act on this instance at all.
    pub fn is_cc_app(&self) -> bool {
        self.domain == crate::domain::CC_APP_DOMAIN
    }
}

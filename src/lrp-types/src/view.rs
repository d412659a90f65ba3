//! The CC-facing projection of an [`ActualInstance`][crate::actual::ActualInstance].
//!
//! Every [`LRPInstanceView`] is constructed fresh per request; it has no
//! persistence of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CellId, Index, InstanceGuid, ProcessGuid};

/// The CC-facing instance state, derived from [`crate::actual::ActualState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    Starting,
    Running,
    Crashed,
    Down,
    Unknown,
}

impl From<crate::actual::ActualState> for ViewState {
    fn from(state: crate::actual::ActualState) -> ViewState {
        use crate::actual::ActualState::*;
        match state {
            Unclaimed | Claimed => ViewState::Starting,
            Running => ViewState::Running,
            Crashed => ViewState::Crashed,
        }
    }
}

/// A per-instance resource-usage sample, projected into the CC-facing
/// shape: CPU as a fraction (not a raw percentage), a historical
/// mebibyte-floor subtraction applied to disk, and an RFC3339 sample time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewStats {
    pub time: DateTime<Utc>,
    pub cpu: f64,
    pub mem: u64,
    pub disk: u64,
}

/// One mebibyte, used by the historical disk-bytes floor subtraction
/// (see [`ViewStats`] and `lrp-projector`).
pub const ONE_MEBIBYTE: u64 = 1024 * 1024;

/// The CC-facing projection of an actual instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LRPInstanceView {
    pub process_guid: ProcessGuid,
    pub instance_guid: InstanceGuid,
    pub cell_id: CellId,
    pub index: Index,
    pub state: ViewState,
    /// Seconds since epoch.
    pub since: i64,
    /// Seconds; clamped to be non-negative.
    pub uptime: i64,
    /// Set only for stats responses.
    #[serde(default)]
    pub host: String,
    /// Host-side port whose container-side port equals the conventional
    /// default, or `0` if no such mapping exists. Set only for stats
    /// responses.
    #[serde(default)]
    pub port: u16,
    /// Carries `placement_error` text when `state == Crashed`.
    pub details: Option<String>,
    pub stats: Option<ViewStats>,
}

//! Data model shared across the lrp-bridge workspace: BBS instance records,
//! desired specs, container metrics, the BBS event stream, and the
//! CC-facing projection.
//!
//! `Actual`/`Desired` LRP ("Long-Running Process") are data-model labels
//! inherited from the upstream orchestration system's vocabulary; the
//! bridge treats them only as record shapes, never interpreting them
//! further than this crate describes.

pub mod actual;
pub mod desired;
pub mod domain;
pub mod event;
pub mod ids;
pub mod metric;
pub mod view;

pub use actual::{ActualInstance, ActualState, NetInfo, Presence, PortMapping};
pub use desired::DesiredSpec;
pub use event::BbsEvent;
pub use ids::{CellId, Index, InstanceGuid, InvalidGuid, ProcessGuid};
pub use metric::ContainerMetric;
pub use view::{LRPInstanceView, ViewState, ViewStats, ONE_MEBIBYTE};

//! The BBS instance-lifecycle event stream, modeled as an algebraic sum
//! type so the watcher can dispatch by `match` rather than by virtual
//! method (see the design notes on the original event model).

use crate::actual::ActualInstance;

/// An event observed on the BBS instance-event subscription. Variants the
/// bridge does not act on are folded into [`BbsEvent::Other`] and merely
/// logged.
#[derive(Debug, Clone)]
pub enum BbsEvent {
    ActualLrpCrashed(ActualInstance),
    ActualLrpInstanceRemoved(ActualInstance),
    ActualLrpInstanceChanged {
        before: ActualInstance,
        after: ActualInstance,
    },
    /// Any other event variant observed on the stream; logged and dropped.
    Other { event_type: String },
}

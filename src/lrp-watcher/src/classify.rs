//! Classification of a [`BbsEvent`] into an outbound CC call, and the
//! routable-change rule that governs [`BbsEvent::ActualLrpInstanceChanged`].

use lrp_cc_client::{AppCrashedRequest, AppReadinessChangedRequest, AppReschedulingRequest};
use lrp_types::{ActualInstance, BbsEvent, Presence, ProcessGuid};

/// An outbound CC call produced by classifying an event, paired with the
/// process guid it targets.
pub enum CcJob {
    Crashed { guid: ProcessGuid, request: AppCrashedRequest },
    Rescheduling { guid: ProcessGuid, request: AppReschedulingRequest },
    ReadinessChanged { guid: ProcessGuid, request: AppReadinessChangedRequest },
}

/// Classifies an observed event into a [`CcJob`], or `None` if the event
/// doesn't warrant forwarding (wrong domain, not evacuating, no routable
/// transition, or a variant this bridge doesn't act on).
pub fn classify(event: BbsEvent) -> Option<CcJob> {
    match event {
        BbsEvent::ActualLrpCrashed(instance) => classify_crashed(instance),
        BbsEvent::ActualLrpInstanceRemoved(instance) => classify_removed(instance),
        BbsEvent::ActualLrpInstanceChanged { before, after } => classify_changed(before, after),
        BbsEvent::Other { event_type } => {
            tracing::trace!(event_type, "ignoring unhandled event variant");
            None
        }
    }
}

fn classify_crashed(instance: ActualInstance) -> Option<CcJob> {
    if !instance.is_cc_app() {
        return None;
    }
    Some(CcJob::Crashed {
        guid: instance.process_guid.clone(),
        request: AppCrashedRequest {
            instance: instance.instance_guid.to_string(),
            index: instance.index,
            cell_id: instance.cell_id.to_string(),
            reason: "CRASHED".to_string(),
            exit_description: instance.crash_reason.unwrap_or_default(),
            crash_count: instance.crash_count,
            crash_timestamp: instance.since,
        },
    })
}

fn classify_removed(instance: ActualInstance) -> Option<CcJob> {
    if !instance.is_cc_app() || instance.presence != Presence::Evacuating {
        return None;
    }
    Some(CcJob::Rescheduling {
        guid: instance.process_guid.clone(),
        request: AppReschedulingRequest {
            instance: instance.instance_guid.to_string(),
            index: instance.index,
            cell_id: instance.cell_id.to_string(),
            reason: "Cell is being evacuated".to_string(),
        },
    })
}

fn classify_changed(before: ActualInstance, after: ActualInstance) -> Option<CcJob> {
    if !after.is_cc_app() {
        return None;
    }
    let ready = routable_change(before.routable, after.routable)?;
    Some(CcJob::ReadinessChanged {
        guid: after.process_guid.clone(),
        request: AppReadinessChangedRequest {
            instance: after.instance_guid.to_string(),
            index: after.index,
            cell_id: after.cell_id.to_string(),
            ready,
        },
    })
}

/// Whether a routable transition from `before` to `after` should be
/// forwarded to CC, and if so, the value to forward.
///
/// `None` on either side means "unset", not "false" — the two are
/// distinguished because an unset-to-false transition is not reported but
/// a false-to-unset one is (see the truth table this implements).
fn routable_change(before: Option<bool>, after: Option<bool>) -> Option<bool> {
    match (before, after) {
        (None, None) => None,
        (None, Some(after_value)) => Some(after_value),
        (Some(before_value), None) => (!before_value).then_some(true),
        (Some(before_value), Some(after_value)) => (before_value != after_value).then_some(after_value),
    }
}

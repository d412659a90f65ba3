//! Parsing of a single event frame off the instance-event subscription.
//!
//! The stream is newline-delimited JSON; each line carries an
//! `event_type` discriminator plus a payload shaped like [`ActualInstance`].
//! A line whose `event_type` is unrecognized by this crate is folded into
//! [`BbsEvent::Other`] (we don't act on it, but the line was well-formed);
//! a line that fails to parse at all is an [`EventSourceError::UnrecognizedEventType`].

use lrp_types::{ActualInstance, BbsEvent};

use crate::event_source::EventSourceError;

pub(crate) fn parse_frame(line: &[u8]) -> Result<BbsEvent, EventSourceError> {
    let value: serde_json::Value =
        serde_json::from_slice(line).map_err(|_| EventSourceError::UnrecognizedEventType)?;
    let event_type = value
        .get("event_type")
        .and_then(|v| v.as_str())
        .ok_or(EventSourceError::UnrecognizedEventType)?;

    match event_type {
        "ActualLRPCrashedEvent" => {
            let instance = actual_instance(&value)?;
            Ok(BbsEvent::ActualLrpCrashed(instance))
        }
        "ActualLRPInstanceRemovedEvent" => {
            let instance = actual_instance(&value)?;
            Ok(BbsEvent::ActualLrpInstanceRemoved(instance))
        }
        "ActualLRPInstanceChangedEvent" => {
            let before = field_instance(&value, "before")?;
            let after = field_instance(&value, "after")?;
            Ok(BbsEvent::ActualLrpInstanceChanged { before, after })
        }
        other => Ok(BbsEvent::Other { event_type: other.to_string() }),
    }
}

fn actual_instance(value: &serde_json::Value) -> Result<ActualInstance, EventSourceError> {
    field_instance(value, "actual_lrp")
}

fn field_instance(
    value: &serde_json::Value,
    field: &str,
) -> Result<ActualInstance, EventSourceError> {
    let payload = value.get(field).ok_or(EventSourceError::UnrecognizedEventType)?;
    serde_json::from_value(payload.clone()).map_err(|_| EventSourceError::UnrecognizedEventType)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance_json() -> serde_json::Value {
        serde_json::json!({
            "process_guid": "p1",
            "instance_guid": "i1",
            "cell_id": "c1",
            "index": 0,
            "domain": "cf-apps",
            "state": "Running",
            "net_info": {"address": "10.0.0.1", "ports": []},
            "since": 1,
            "crash_count": 0,
            "crash_reason": null,
            "placement_error": null,
            "presence": "Ordinary",
            "routable": true,
        })
    }

    #[test]
    fn parses_crashed_event() {
        let frame = serde_json::json!({
            "event_type": "ActualLRPCrashedEvent",
            "actual_lrp": sample_instance_json(),
        });
        let event = parse_frame(frame.to_string().as_bytes()).unwrap();
        assert!(matches!(event, BbsEvent::ActualLrpCrashed(_)));
    }

    #[test]
    fn parses_changed_event_with_before_and_after() {
        let frame = serde_json::json!({
            "event_type": "ActualLRPInstanceChangedEvent",
            "before": sample_instance_json(),
            "after": sample_instance_json(),
        });
        let event = parse_frame(frame.to_string().as_bytes()).unwrap();
        assert!(matches!(event, BbsEvent::ActualLrpInstanceChanged { .. }));
    }

    #[test]
    fn unknown_event_type_is_other() {
        let frame = serde_json::json!({"event_type": "DesiredLRPCreatedEvent"});
        let event = parse_frame(frame.to_string().as_bytes()).unwrap();
        match event {
            BbsEvent::Other { event_type } => assert_eq!(event_type, "DesiredLRPCreatedEvent"),
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn missing_payload_is_unrecognized() {
        let frame = serde_json::json!({"event_type": "ActualLRPCrashedEvent"});
        let error = parse_frame(frame.to_string().as_bytes()).unwrap_err();
        assert!(matches!(error, EventSourceError::UnrecognizedEventType));
    }

    #[test]
    fn malformed_json_is_unrecognized() {
        let error = parse_frame(b"not json").unwrap_err();
        assert!(matches!(error, EventSourceError::UnrecognizedEventType));
    }
}

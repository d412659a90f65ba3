//! A pure mapping from BBS instance records to the CC-facing
//! [`LRPInstanceView`] projection.
//!
//! Every function here takes `now` as a parameter instead of reading the
//! wall clock, so the module is deterministic and trivially testable; see
//! `lrp-ore::now` for the wall-clock source callers should thread through.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use lrp_types::{
    ActualInstance, ActualState, ContainerMetric, Index, LRPInstanceView, ProcessGuid, ViewState,
    ViewStats, ONE_MEBIBYTE,
};

/// The conventional container-side port CC expects `Host`/`Port` to be
/// derived from, absent a config override.
pub const DEFAULT_CONTAINER_PORT: u16 = 8080;

fn uptime_seconds(since_nanos: i64, now: DateTime<Utc>) -> i64 {
    let now_nanos = now.timestamp_nanos_opt().unwrap_or(i64::MAX);
    let elapsed_seconds = (now_nanos.saturating_sub(since_nanos)) / 1_000_000_000;
    elapsed_seconds.max(0)
}

/// Projects a single observed instance into its CC-facing view. `host` and
/// `port` are left at their zero values; only the stats endpoint populates
/// them (see [`attach_stats`]).
pub fn project_instance(actual: &ActualInstance, now: DateTime<Utc>) -> LRPInstanceView {
    let details = match actual.state {
        ActualState::Crashed => actual.placement_error.clone(),
        _ => None,
    };
    LRPInstanceView {
        process_guid: actual.process_guid.clone(),
        instance_guid: actual.instance_guid.clone(),
        cell_id: actual.cell_id.clone(),
        index: actual.index,
        state: ViewState::from(actual.state),
        since: actual.since / 1_000_000_000,
        uptime: uptime_seconds(actual.since, now),
        host: String::new(),
        port: 0,
        details,
        stats: None,
    }
}

fn synthesize_starting(process_guid: &ProcessGuid, index: Index) -> LRPInstanceView {
    LRPInstanceView {
        process_guid: process_guid.clone(),
        instance_guid: Default::default(),
        cell_id: Default::default(),
        index,
        state: ViewState::Starting,
        since: 0,
        uptime: 0,
        host: String::new(),
        port: 0,
        details: None,
        stats: None,
    }
}

/// Projects every observed instance of `process_guid`, then synthesizes a
/// `Starting` view (empty instance guid, `since = 0`) for every index in
/// `0..target_instances` that wasn't observed.
pub fn project_status(
    process_guid: &ProcessGuid,
    actuals: &[ActualInstance],
    target_instances: u32,
    now: DateTime<Utc>,
) -> Vec<LRPInstanceView> {
    let mut views: Vec<LRPInstanceView> =
        actuals.iter().map(|actual| project_instance(actual, now)).collect();

    let observed: BTreeSet<Index> = actuals.iter().map(|actual| actual.index).collect();
    for index in 0..target_instances {
        if !observed.contains(&index) {
            views.push(synthesize_starting(process_guid, index));
        }
    }
    views
}

/// Projects every observed instance, attaching `Stats` (CPU as a fraction,
/// disk with the historical mebibyte-floor subtraction, `host`/`port` from
/// the instance's net info) when a matching [`ContainerMetric`] exists. An
/// instance without a matching metric gets `stats = None`.
pub fn project_stats(
    actuals: &[ActualInstance],
    metrics: &[ContainerMetric],
    default_container_port: u16,
    now: DateTime<Utc>,
) -> Vec<LRPInstanceView> {
    let metrics_by_index: HashMap<Index, &ContainerMetric> =
        metrics.iter().map(|metric| (metric.instance_index, metric)).collect();

    actuals
        .iter()
        .map(|actual| {
            let mut view = project_instance(actual, now);
            view.host = actual.net_info.address.clone();
            view.port = actual.net_info.host_port_for(default_container_port);
            view.stats = metrics_by_index
                .get(&actual.index)
                .map(|metric| project_stats_sample(metric, now));
            view
        })
        .collect()
}

fn project_stats_sample(metric: &ContainerMetric, now: DateTime<Utc>) -> ViewStats {
    let disk = if metric.disk_bytes > ONE_MEBIBYTE {
        metric.disk_bytes - ONE_MEBIBYTE
    } else {
        0
    };
    ViewStats {
        time: now,
        cpu: metric.cpu_percentage / 100.0,
        mem: metric.memory_bytes,
        disk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lrp_types::{CellId, InstanceGuid, NetInfo, PortMapping, Presence};
    use proptest::prelude::*;

    fn sample_actual(index: Index, state: ActualState, since: i64) -> ActualInstance {
        ActualInstance {
            process_guid: "p1".parse().unwrap(),
            instance_guid: InstanceGuid("i1".into()),
            cell_id: CellId("c1".into()),
            index,
            domain: "cc-app".into(),
            state,
            net_info: NetInfo::default(),
            since,
            crash_count: 0,
            crash_reason: None,
            placement_error: None,
            presence: Presence::Ordinary,
            routable: None,
        }
    }

    #[test]
    fn unclaimed_and_claimed_project_to_starting() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        for state in [ActualState::Unclaimed, ActualState::Claimed] {
            let view = project_instance(&sample_actual(0, state, 0), now);
            assert_eq!(view.state, ViewState::Starting);
        }
    }

    #[test]
    fn missing_index_synthesis_covers_full_multiset() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let guid: ProcessGuid = "p1".parse().unwrap();
        let running = sample_actual(1, ActualState::Running, 1_700_000_000_000_000_000);
        let views = project_status(&guid, std::slice::from_ref(&running), 3, now);

        let mut indices: Vec<Index> = views.iter().map(|v| v.index).collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1, 2]);

        let states: HashMap<Index, ViewState> = views.iter().map(|v| (v.index, v.state)).collect();
        assert_eq!(states[&0], ViewState::Starting);
        assert_eq!(states[&1], ViewState::Running);
        assert_eq!(states[&2], ViewState::Starting);

        let uptimes: HashMap<Index, i64> = views.iter().map(|v| (v.index, v.uptime)).collect();
        assert!(uptimes[&1] > 0);
        assert_eq!(uptimes[&0], 0);
        assert_eq!(uptimes[&2], 0);
    }

    #[test]
    fn port_selection_returns_zero_without_a_matching_mapping() {
        let net_info = NetInfo {
            address: "10.0.0.1".into(),
            ports: vec![PortMapping { container_port: 1234, host_port: 6000 }],
        };
        assert_eq!(net_info.host_port_for(DEFAULT_CONTAINER_PORT), 0);
        let net_info = NetInfo {
            address: "10.0.0.1".into(),
            ports: vec![PortMapping { container_port: DEFAULT_CONTAINER_PORT, host_port: 6001 }],
        };
        assert_eq!(net_info.host_port_for(DEFAULT_CONTAINER_PORT), 6001);
    }

    #[test]
    fn disk_floor_subtraction_applies_only_above_one_mebibyte() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let actual = sample_actual(0, ActualState::Running, 0);
        let small = ContainerMetric { instance_index: 0, cpu_percentage: 50.0, memory_bytes: 10, disk_bytes: 100 };
        let large = ContainerMetric {
            instance_index: 0,
            cpu_percentage: 50.0,
            memory_bytes: 10,
            disk_bytes: ONE_MEBIBYTE + 500,
        };
        let views = project_stats(std::slice::from_ref(&actual), &[small], DEFAULT_CONTAINER_PORT, now);
        assert_eq!(views[0].stats.unwrap().disk, 0);
        let views = project_stats(std::slice::from_ref(&actual), &[large], DEFAULT_CONTAINER_PORT, now);
        assert_eq!(views[0].stats.unwrap().disk, 500);
    }

    #[test]
    fn instances_without_a_matching_metric_get_null_stats() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let actual = sample_actual(0, ActualState::Running, 0);
        let views = project_stats(std::slice::from_ref(&actual), &[], DEFAULT_CONTAINER_PORT, now);
        assert!(views[0].stats.is_none());
    }

    proptest! {
        #[test]
        fn uptime_is_monotone_under_a_fixed_since(elapsed_secs in 0i64..1_000_000, extra_secs in 0i64..1_000_000) {
            let since = 1_700_000_000_000_000_000i64;
            let t0 = Utc.timestamp_nanos(since + elapsed_secs * 1_000_000_000);
            let t1 = Utc.timestamp_nanos(since + (elapsed_secs + extra_secs) * 1_000_000_000);
            let u0 = uptime_seconds(since, t0);
            let u1 = uptime_seconds(since, t1);
            prop_assert!(u1 >= u0);
        }

        #[test]
        fn port_selection_matches_spec_property(container_port in 1u16..65535, host_port in 1u16..65535, other_port in 1u16..65535) {
            prop_assume!(other_port != container_port);
            let with_match = NetInfo {
                address: String::new(),
                ports: vec![PortMapping { container_port, host_port }],
            };
            prop_assert_eq!(with_match.host_port_for(container_port), host_port);

            let without_match = NetInfo {
                address: String::new(),
                ports: vec![PortMapping { container_port: other_port, host_port }],
            };
            prop_assert_eq!(without_match.host_port_for(container_port), 0);
        }
    }
}

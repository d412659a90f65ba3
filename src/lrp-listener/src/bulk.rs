//! Bounded-parallel fan-out for `BulkLRPStatus`: a fixed set of `B` worker
//! tasks drain a queue of process guids, each writing its own result into a
//! shared map; a per-guid failure is logged and simply excludes that guid
//! from the response rather than failing the whole call.
//!
//! Grounded in `original_source/handler/bulklrpstatus/bulklrpstatus.go`'s
//! `workpool.NewThrottler` + `sync.Mutex`-guarded `statusBundle` map,
//! translated to the teacher's async task/channel idiom (see
//! `lrp-watcher`'s `WorkerPool`, which this mirrors in the other
//! direction: fixed consumers draining a bounded queue).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use lrp_types::{LRPInstanceView, ProcessGuid};

/// Runs `work(guid)` for every guid in `guids`, across `workers` concurrent
/// tasks, and collects the `Some` results into a map keyed by guid. A `None`
/// result (the per-guid failure case) simply omits that guid.
pub async fn fan_out<F, Fut>(
    guids: Vec<ProcessGuid>,
    workers: usize,
    work: F,
) -> HashMap<ProcessGuid, Vec<LRPInstanceView>>
where
    F: Fn(ProcessGuid) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Vec<LRPInstanceView>>> + Send + 'static,
{
    let total = guids.len();
    let (tx, rx) = mpsc::channel(total.max(1));
    for guid in guids {
        tx.send(guid).await.expect("channel is sized to hold every guid");
    }
    drop(tx);

    let rx = Arc::new(Mutex::new(rx));
    let work = Arc::new(work);
    let results = Arc::new(Mutex::new(HashMap::with_capacity(total)));

    let worker_count = workers.min(total).max(1);
    let handles: Vec<_> = (0..worker_count)
        .map(|_| {
            let rx = Arc::clone(&rx);
            let work = Arc::clone(&work);
            let results = Arc::clone(&results);
            tokio::spawn(async move {
                loop {
                    let guid = { rx.lock().await.recv().await };
                    let Some(guid) = guid else { return };
                    if let Some(views) = work(guid.clone()).await {
                        results.lock().await.insert(guid, views);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.await;
    }

    Arc::try_unwrap(results).expect("all workers joined before this point").into_inner()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lrp_types::{ActualState, CellId, InstanceGuid, NetInfo, Presence};

    use super::*;

    fn guid(s: &str) -> ProcessGuid {
        s.parse().unwrap()
    }

    fn view(guid: &ProcessGuid) -> LRPInstanceView {
        lrp_projector::project_instance(
            &lrp_types::ActualInstance {
                process_guid: guid.clone(),
                instance_guid: InstanceGuid("i".into()),
                cell_id: CellId("c".into()),
                index: 0,
                domain: "cc-app".into(),
                state: ActualState::Running,
                net_info: NetInfo::default(),
                since: 0,
                crash_count: 0,
                crash_reason: None,
                placement_error: None,
                presence: Presence::Ordinary,
                routable: None,
            },
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn collects_successful_results_and_drops_failures() {
        let guids = vec![guid("p1"), guid("p2"), guid("p3")];
        let results = fan_out(guids, 2, |guid| async move {
            if guid.as_str() == "p2" {
                None
            } else {
                Some(vec![view(&guid)])
            }
        })
        .await;
        assert_eq!(results.len(), 2);
        assert!(results.contains_key(&guid("p1")));
        assert!(!results.contains_key(&guid("p2")));
        assert!(results.contains_key(&guid("p3")));
    }

    #[tokio::test]
    async fn never_exceeds_configured_worker_concurrency() {
        let guids: Vec<ProcessGuid> = (0..20).map(|i| guid(&format!("p{i}"))).collect();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));
        let workers = 3;

        let in_flight_for_closure = Arc::clone(&in_flight);
        let max_observed_for_closure = Arc::clone(&max_observed);
        let results = fan_out(guids, workers, move |guid| {
            let in_flight = Arc::clone(&in_flight_for_closure);
            let max_observed = Arc::clone(&max_observed_for_closure);
            async move {
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Some(vec![view(&guid)])
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        assert!(max_observed.load(Ordering::SeqCst) <= workers);
    }
}

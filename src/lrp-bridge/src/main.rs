//! The supervisor binary (§4.H): acquires the leader lock, then runs the
//! watcher and listener as independently supervised tasks sharing one
//! cancellation token, plus an internal HTTP surface exposing `/metrics`
//! and `/api/livez`.
//!
//! Grounded in the teacher's `clusterd` binary (`other_examples/…
//! clusterd.rs`): a `clap::Parser` args struct, an internal axum server
//! spawned via `lrp_ore::task::spawn` alongside the "real" components, and
//! the process blocking until every spawned task has exited. `clusterd`
//! itself never needs to cascade shutdown between its components; this
//! binary adds that cascade explicitly, since component failure here
//! (leadership loss, an unrecoverable bind error) must bring the whole
//! process down in a controlled order.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lrp_bbs_client::BbsClient;
use lrp_cc_client::{CcClient, TlsConfigFactory};
use lrp_config::BridgeConfig;
use lrp_leader_lock::{LeaderLock, ProcessLeaderLock};
use lrp_listener::metrics::ListenerMetrics;
use lrp_listener::state::ListenerState;
use lrp_metrics_client::MetricsClient;
use lrp_ore::metrics::MetricsRegistry;
use lrp_watcher::metrics::WatcherMetrics;
use lrp_watcher::{Watcher, WatcherConfig};

/// How long the supervisor waits for spawned tasks to exit after cascading
/// a shutdown before giving up and exiting anyway.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "lrp-bridge", about = "Runs the watcher and listener under one supervisor")]
struct Args {
    #[arg(long, env = "LRP_BRIDGE_CONFIG_PATH")]
    config_path: std::path::PathBuf,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match BridgeConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("lrp-bridge: invalid configuration: {error}");
            return ExitCode::from(2);
        }
    };

    lrp_ore::tracing::configure("lrp-bridge", config.log_level);

    let registry = MetricsRegistry::new();
    let shutdown = CancellationToken::new();

    let listener_task = match spawn_listener(&config, &registry) {
        Ok(handle) => handle,
        Err(error) => {
            eprintln!("lrp-bridge: failed to start listener: {error}");
            return ExitCode::from(2);
        }
    };

    let watcher_task = match spawn_watcher(&config, &registry, shutdown.clone()) {
        Ok(handle) => handle,
        Err(error) => {
            eprintln!("lrp-bridge: failed to start watcher: {error}");
            shutdown.cancel();
            listener_task.abort();
            return ExitCode::from(2);
        }
    };

    let telemetry_task = spawn_telemetry_server(config.telemetry_port, registry.clone());

    tracing::info!("lrp-bridge running");

    let exit_code = tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
            match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, watcher_task).await {
                Ok(_) => {}
                Err(_) => tracing::warn!("watcher did not exit within the shutdown grace period"),
            }
            ExitCode::SUCCESS
        }
        result = watcher_task => {
            tracing::error!("watcher task exited unexpectedly: {result:?}");
            shutdown.cancel();
            ExitCode::from(1)
        }
    };

    listener_task.abort();
    telemetry_task.abort();
    exit_code
}

/// Builds and spawns the listener task, which runs independently of leader
/// election (§2: "(F) runs independently").
fn spawn_listener(config: &BridgeConfig, registry: &MetricsRegistry) -> anyhow::Result<JoinHandle<()>> {
    let listener_metrics = Arc::new(ListenerMetrics::register(registry));
    let state = ListenerState {
        bbs: Arc::new(BbsClient::new(config.bbs_api_url.clone(), false)),
        metrics: Arc::new(MetricsClient::new(config.traffic_controller_url.clone(), config.skip_cert_verify)),
        admission: Arc::new(Semaphore::new(config.max_in_flight_requests)),
        bulk_workers: config.bulk_lrp_status_workers,
        default_container_port: config.default_container_port,
        process_metrics: Some(listener_metrics),
    };
    let app = lrp_listener::router(state);
    let listen_address = config.listen_address.clone();

    Ok(lrp_ore::task::spawn(|| "lrp-listener", async move {
        tracing::info!(address = %listen_address, "listener starting");
        let tcp_listener = match tokio::net::TcpListener::bind(&listen_address).await {
            Ok(listener) => listener,
            Err(error) => {
                tracing::error!(%error, "listener failed to bind");
                return;
            }
        };
        if let Err(error) = axum::serve(tcp_listener, app).await {
            tracing::error!(%error, "listener server error");
        }
    }))
}

/// Builds and spawns the watcher task behind leader election (§4.G/§4.H):
/// blocks acquiring the lock before the watch loop starts, and exits the
/// task (which the supervisor treats as fatal) if leadership is lost.
fn spawn_watcher(
    config: &BridgeConfig,
    registry: &MetricsRegistry,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let tls = TlsConfigFactory::build(
        Path::new(&config.cc_client_cert),
        Path::new(&config.cc_client_key),
        Path::new(&config.cc_ca_cert),
    )?;
    let cc = CcClient::new(config.cc_base_url.clone(), tls)?
        .with_readiness_changed_path(config.readiness_changed_path.clone());
    let bbs = BbsClient::new(config.bbs_api_url.clone(), false);
    let watcher_metrics = WatcherMetrics::register(registry);
    let watcher_config = WatcherConfig {
        worker_pool_size: config.max_event_handling_workers,
        retry_pause_interval: Duration::from_secs(1),
        max_consecutive_next_errors: config.watcher_max_consecutive_next_errors,
    };
    let watcher = Arc::new(Watcher::new(bbs, cc, watcher_config).with_metrics(watcher_metrics));

    let lock_retry_interval = config.lock_retry_interval;
    let lock_ttl = config.lock_ttl;
    let identity = std::env::var("HOSTNAME").unwrap_or_else(|_| "lrp-bridge".to_string());

    Ok(lrp_ore::task::spawn(|| "lrp-watcher", async move {
        let leader_lock = ProcessLeaderLock;
        tracing::info!("acquiring leader lock");
        let handle = leader_lock.acquire(&identity, lock_retry_interval, lock_ttl).await;
        tracing::info!("leader lock acquired, starting watch loop");

        tokio::select! {
            _ = handle.lost() => {
                tracing::error!("leadership lost");
            }
            _ = watcher.run(shutdown.clone()) => {
                tracing::info!("watcher run loop returned");
            }
            _ = shutdown.cancelled() => {
                tracing::info!("watcher cancelled by supervisor");
            }
        }
    }))
}

/// The internal telemetry surface: `/metrics` (Prometheus text exposition)
/// and `/api/livez` (a bare liveness probe), mirroring the teacher's
/// `clusterd` internal HTTP server.
fn spawn_telemetry_server(port: u16, registry: MetricsRegistry) -> JoinHandle<()> {
    let app = Router::new()
        .route("/api/livez", get(|| async { "ok" }))
        .route(
            "/metrics",
            get(move || {
                let registry = registry.clone();
                async move { registry.encode_text().unwrap_or_default() }
            }),
        );
    let address = format!("0.0.0.0:{port}");

    lrp_ore::task::spawn(|| "lrp-bridge-telemetry", async move {
        tracing::info!(%address, "telemetry server starting");
        match tokio::net::TcpListener::bind(&address).await {
            Ok(tcp_listener) => {
                if let Err(error) = axum::serve(tcp_listener, app).await {
                    tracing::error!(%error, "telemetry server error");
                }
            }
            Err(error) => {
                tracing::error!(%error, "telemetry server failed to bind");
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("installing a SIGTERM handler should not fail");
        signal.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

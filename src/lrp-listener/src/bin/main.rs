//! The listener as a standalone binary, independent of leader election
//! (it serves reads, per §2's control-flow note: "(F) runs independently").
//!
//! Grounded in the teacher's `clusterd` binary shape: a `clap::Parser` args
//! struct with a config-path flag, a tracing bootstrap, a `MetricsRegistry`,
//! and component tasks spawned via `lrp_ore::task::spawn` with the process
//! blocking on a shutdown signal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use axum::routing::get;
use clap::Parser;
use tokio::sync::Semaphore;

use lrp_bbs_client::BbsClient;
use lrp_config::BridgeConfig;
use lrp_listener::metrics::ListenerMetrics;
use lrp_listener::state::ListenerState;
use lrp_metrics_client::MetricsClient;
use lrp_ore::metrics::MetricsRegistry;

#[derive(Parser, Debug)]
#[command(name = "lrp-listener", about = "Read-only HTTP API over BBS and container metrics")]
struct Args {
    #[arg(long, env = "LRP_BRIDGE_CONFIG_PATH")]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match BridgeConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("lrp-listener: invalid configuration: {error}");
            return ExitCode::from(2);
        }
    };

    lrp_ore::tracing::configure("lrp-listener", config.log_level);

    let registry = MetricsRegistry::new();
    let listener_metrics = Arc::new(ListenerMetrics::register(&registry));

    let state = ListenerState {
        bbs: Arc::new(BbsClient::new(config.bbs_api_url.clone(), false)),
        metrics: Arc::new(MetricsClient::new(config.traffic_controller_url.clone(), config.skip_cert_verify)),
        admission: Arc::new(Semaphore::new(config.max_in_flight_requests)),
        bulk_workers: config.bulk_lrp_status_workers,
        default_container_port: config.default_container_port,
        process_metrics: Some(listener_metrics),
    };

    let app = lrp_listener::router(state).route(
        "/metrics",
        get(move || {
            let registry = registry.clone();
            async move { registry.encode_text().unwrap_or_default() }
        }),
    );

    tracing::info!(address = %config.listen_address, "listener starting");
    let tcp_listener = match tokio::net::TcpListener::bind(&config.listen_address).await {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("lrp-listener: failed to bind {}: {error}", config.listen_address);
            return ExitCode::from(1);
        }
    };

    if let Err(error) = axum::serve(tcp_listener, app).await {
        eprintln!("lrp-listener: server error: {error}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

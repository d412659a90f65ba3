//! The watcher as a standalone binary: acquires the leader lock, then runs
//! the watch loop for as long as leadership is held, exiting non-zero on
//! leadership loss (§4.G) or unrecoverable initialization failure.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use lrp_bbs_client::BbsClient;
use lrp_cc_client::{CcClient, TlsConfigFactory};
use lrp_config::BridgeConfig;
use lrp_leader_lock::{LeaderLock, ProcessLeaderLock};
use lrp_ore::metrics::MetricsRegistry;
use lrp_watcher::metrics::WatcherMetrics;
use lrp_watcher::{Watcher, WatcherConfig};

#[derive(Parser, Debug)]
#[command(name = "lrp-watcher", about = "Forwards BBS instance lifecycle events to CC")]
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
            eprintln!("lrp-watcher: invalid configuration: {error}");
            return ExitCode::from(2);
        }
    };

    lrp_ore::tracing::configure("lrp-watcher", config.log_level);

    let tls = match TlsConfigFactory::build(
        Path::new(&config.cc_client_cert),
        Path::new(&config.cc_client_key),
        Path::new(&config.cc_ca_cert),
    ) {
        Ok(tls) => tls,
        Err(error) => {
            eprintln!("lrp-watcher: failed to load CC TLS material: {error}");
            return ExitCode::from(2);
        }
    };
    let cc = match CcClient::new(config.cc_base_url.clone(), tls) {
        Ok(cc) => cc.with_readiness_changed_path(config.readiness_changed_path.clone()),
        Err(error) => {
            eprintln!("lrp-watcher: failed to build CC client: {error}");
            return ExitCode::from(2);
        }
    };
    let bbs = BbsClient::new(config.bbs_api_url.clone(), false);

    let registry = MetricsRegistry::new();
    let watcher_metrics = WatcherMetrics::register(&registry);

    let watcher_config = WatcherConfig {
        worker_pool_size: config.max_event_handling_workers,
        retry_pause_interval: Duration::from_secs(1),
        max_consecutive_next_errors: config.watcher_max_consecutive_next_errors,
    };
    let watcher = Arc::new(Watcher::new(bbs, cc, watcher_config).with_metrics(watcher_metrics));

    let leader_lock = ProcessLeaderLock;
    let identity = std::env::var("HOSTNAME").unwrap_or_else(|_| "lrp-watcher".to_string());
    tracing::info!("acquiring leader lock");
    let handle = leader_lock.acquire(&identity, config.lock_retry_interval, config.lock_ttl).await;
    tracing::info!("leader lock acquired, starting watch loop");

    let shutdown = CancellationToken::new();
    let watcher_task = {
        let watcher = Arc::clone(&watcher);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { watcher.run(shutdown).await })
    };

    tokio::select! {
        _ = handle.lost() => {
            tracing::error!("leadership lost, exiting");
            shutdown.cancel();
            let _ = watcher_task.await;
            return ExitCode::from(1);
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
            let _ = watcher_task.await;
        }
    }

    ExitCode::SUCCESS
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

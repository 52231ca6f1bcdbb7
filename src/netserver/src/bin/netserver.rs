use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use netmap_ore::cli::{self, CliConfig};
use netmap_ore::error::ErrorExt;
use netmap_ore::metrics::MetricsRegistry;
use netmap_cluster::PeerManager;
use netmap_rpc::GrpcServer;
use netmap_store::MemoryStore;
use netserver::{Args, AppState, FileConfig};

#[tokio::main]
async fn main() {
    let args: Args = cli::parse_args(CliConfig {
        env_prefix: None,
        enable_version_flag: true,
    });
    if let Err(err) = run(args).await {
        eprintln!("netserver: fatal: {}", err.display_with_causes());
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), anyhow::Error> {
    netmap_ore::logging::init(&args.log_filter);

    if args.db_conn_string != "cache" {
        anyhow::bail!(
            "unsupported store backend {:?}; only the in-memory \"cache\" backend is built into this binary",
            args.db_conn_string
        );
    }

    let file_config = FileConfig::load(args.config_file.as_ref()).context("loading config file")?;

    let metrics = MetricsRegistry::new();
    let store = Arc::new(MemoryStore::new(file_config.record_limit));
    store.create_tables().await.context("creating store schema")?;
    store.load_tables().await.context("loading store tables")?;

    let peer_addrs = if args.initial_cluster.is_empty() {
        vec![args.listen_peer_address.to_string()]
    } else {
        args.initial_cluster.clone()
    };
    let peers = Arc::new(PeerManager::new(peer_addrs));

    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&peers),
        file_config.notifier_urls.clone(),
        metrics,
    )?);

    let (shutdown_tx, _) = tokio::sync::watch::channel(false);

    let signal_tx = shutdown_tx.clone();
    netmap_ore::task::spawn(|| "signal-watch", async move {
        netmap_ore::signal::wait_for_shutdown().await;
        let _ = signal_tx.send(true);
    });

    let housekeeping = Arc::clone(&peers);
    netmap_ore::task::spawn(|| "peer-housekeeping", async move {
        housekeeping.run().await;
    });

    let rpc_addr = args.listen_peer_address;
    let rpc_store = Arc::clone(&store);
    let mut rpc_shutdown = shutdown_tx.subscribe();
    netmap_ore::task::spawn(|| "rpc-server", async move {
        let server = GrpcServer::new(rpc_store);
        let shutdown = async move {
            let _ = rpc_shutdown.changed().await;
        };
        if let Err(err) = server.serve_with_shutdown(rpc_addr, shutdown).await {
            tracing::error!(error = %err.display_with_causes(), "peer RPC server exited");
        }
    });

    let http_shutdown = shutdown_tx.subscribe();
    serve_http(args.listen_client_address, state, &file_config, http_shutdown).await
}

async fn serve_http(
    addr: SocketAddr,
    state: Arc<AppState>,
    file_config: &FileConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> Result<(), anyhow::Error> {
    let router = netserver::build_router(state, &file_config.cors_allowed_origins);
    tracing::info!(%addr, "serving netmap HTTP API");
    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .context("HTTP server exited")
}

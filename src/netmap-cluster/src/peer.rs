use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use netmap_rpc::GrpcClient;
use tokio::sync::Mutex;

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(10);
const DIAL_TIMEOUT: Duration = Duration::from_secs(2);

struct PeerConnection {
    client: GrpcClient,
}

/// Maintains a persistent gRPC connection to every peer in the configured
/// cluster, redialing and replacing on health-check failure. Dead peers are
/// retained in the map with no connection so that the housekeeping loop
/// keeps retrying them.
pub struct PeerManager {
    addrs: Vec<String>,
    connections: Arc<Mutex<HashMap<String, PeerConnection>>>,
}

impl PeerManager {
    pub fn new(addrs: Vec<String>) -> Self {
        PeerManager {
            addrs,
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Every configured peer this manager knows about, regardless of
    /// whether a live connection currently exists.
    pub fn peers(&self) -> &[String] {
        &self.addrs
    }

    /// Runs the 10 s housekeeping loop forever. Intended to be driven by
    /// `netmap_ore::task::spawn`.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        loop {
            ticker.tick().await;
            self.housekeep_once().await;
        }
    }

    async fn housekeep_once(&self) {
        for addr in &self.addrs {
            let mut connections = self.connections.lock().await;
            let needs_redial = match connections.get_mut(addr) {
                Some(conn) => conn.client.healthy().await.is_err(),
                None => true,
            };
            if needs_redial {
                drop(connections);
                match GrpcClient::connect_timeout(addr, DIAL_TIMEOUT).await {
                    Ok(client) => {
                        self.connections
                            .lock()
                            .await
                            .insert(addr.clone(), PeerConnection { client });
                    }
                    Err(err) => {
                        tracing::warn!(peer = %addr, error = %err, "peer dial failed, will retry");
                        self.connections.lock().await.remove(addr);
                    }
                }
            }
        }
    }

    /// Calls `f` against every peer for which a live connection currently
    /// exists, concurrently, returning the results in peer order. Peers
    /// without a live connection are skipped (they will be redialed by the
    /// next housekeeping tick) rather than failing the whole fan-out.
    pub async fn fan_out<F, Fut, T>(&self, f: F) -> Vec<Result<T, netmap_types::NetmapError>>
    where
        F: Fn(GrpcClient) -> Fut,
        Fut: std::future::Future<Output = Result<T, netmap_types::NetmapError>>,
    {
        let clients: Vec<GrpcClient> = {
            let connections = self.connections.lock().await;
            self.addrs
                .iter()
                .filter_map(|addr| connections.get(addr).map(|conn| conn.client.clone()))
                .collect()
        };
        futures::future::join_all(clients.into_iter().map(f)).await
    }
}

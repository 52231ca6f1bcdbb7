use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Command-line and environment configuration for a single cluster node.
#[derive(Debug, clap::Parser)]
#[clap(name = "netserver", version)]
pub struct Args {
    /// Address the HTTP API listens on.
    #[clap(
        long = "listen.client-address",
        env = "NETSERVER_CLIENT_ADDRESS",
        default_value = "127.0.0.1:8084"
    )]
    pub listen_client_address: SocketAddr,

    /// Address the peer gRPC server listens on.
    #[clap(
        long = "listen.peer-address",
        env = "NETSERVER_PEER_ADDRESS",
        default_value = "127.0.0.1:8085"
    )]
    pub listen_peer_address: SocketAddr,

    /// Comma-separated list of peer addresses forming the cluster.
    #[clap(long = "initial-cluster", env = "NETSERVER_INITIAL_CLUSTER", value_delimiter = ',')]
    pub initial_cluster: Vec<String>,

    /// Store backend connection string. Only the in-memory backend is built
    /// into this binary; anything else is rejected at boot.
    #[clap(
        long = "db.conn-string",
        env = "NETSERVER_DB_CONN_STRING",
        default_value = "cache"
    )]
    pub db_conn_string: String,

    /// Optional YAML file overlaying static per-node settings (notifier
    /// URLs, CORS allow-list, store record limit).
    #[clap(long = "config.file", env = "NETSERVER_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Log every HTTP request at info level.
    #[clap(long = "log.http-requests", env = "NETSERVER_LOG_HTTP_REQUESTS")]
    pub log_http_requests: bool,

    #[clap(long = "log.filter", env = "NETSERVER_LOG_FILTER", default_value = "info")]
    pub log_filter: String,
}

/// Static settings that only make sense in a config file, not as flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub notifier_urls: Vec<String>,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_record_limit")]
    pub record_limit: usize,
}

fn default_record_limit() -> usize {
    netmap_store::DEFAULT_LIMIT
}

impl FileConfig {
    pub fn load(path: Option<&PathBuf>) -> Result<Self, anyhow::Error> {
        match path {
            None => Ok(FileConfig {
                record_limit: default_record_limit(),
                ..Default::default()
            }),
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(serde_yaml::from_str(&contents)?)
            }
        }
    }
}

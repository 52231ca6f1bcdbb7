use std::sync::Arc;

use netmap_client::{ClientConfig, UrlSet};
use netmap_ore::cli::{self, CliConfig};
use netmap_ore::error::ErrorExt;
use netmap_types::{Options, SockTable};

use netagent::{AgentCache, Config};

#[tokio::main]
async fn main() {
    let args: netagent::config::Args = cli::parse_args(CliConfig {
        env_prefix: Some("NETAGENT_"),
        enable_version_flag: true,
    });
    if let Err(err) = run(args).await {
        eprintln!("netagent: fatal: {}", err.display_with_causes());
        std::process::exit(1);
    }
}

async fn run(args: netagent::config::Args) -> Result<(), anyhow::Error> {
    netmap_ore::logging::init(&args.log_filter);

    let config = Config::load(&args.config_file)?;
    let cache = Arc::new(AgentCache::new(config.cache_limit));

    let (shutdown_tx, _) = tokio::sync::watch::channel(false);

    let mut tasks = Vec::new();

    let signal_tx = shutdown_tx.clone();
    tasks.push(netmap_ore::task::spawn(|| "signal-watch", async move {
        netmap_ore::signal::wait_for_shutdown().await;
        let _ = signal_tx.send(true);
    }));

    for connection in &config.connections {
        let cache = Arc::clone(&cache);
        let connection_urls = connection.urls.clone();
        let client_config = ClientConfig::new(connection_urls)
            .timeout(std::time::Duration::from_secs(5));
        let client_config = apply_auth(client_config, connection);
        let url_set = Arc::new(UrlSet::new(client_config)?);
        let interval = connection.interval;
        let flush_interval_secs = config.cache_flush_interval.as_secs() as i64;
        let plugin = args.plugin.clone();
        let debug = args.debug;
        let shutdown = shutdown_tx.subscribe();

        tasks.push(netmap_ore::task::spawn(|| "connection-loop", async move {
            loop_a(url_set, cache, interval, flush_interval_secs, &plugin, debug, shutdown).await;
        }));
    }

    if let Some(netstat) = config.netstat {
        let urls = config.urls.clone();
        let shutdown = shutdown_tx.subscribe();
        tasks.push(netmap_ore::task::spawn(|| "netstat-loop", async move {
            loop_b(urls, netstat, shutdown).await;
        }));
    }

    let _ = futures::future::join_all(tasks).await;
    Ok(())
}

fn apply_auth(mut client_config: ClientConfig, connection: &netagent::ConnectionConfig) -> ClientConfig {
    if !connection.username.is_empty() || !connection.password.is_empty() {
        client_config = client_config.basic_auth(connection.username.clone(), connection.password.clone());
    }
    if !connection.bearer_token.is_empty() {
        client_config = client_config.bearer_token_file(connection.bearer_token.clone().into());
    }
    for (key, value) in &connection.headers {
        client_config = client_config.header(key.clone(), value.clone());
    }
    client_config
}

async fn loop_a(
    client: Arc<UrlSet>,
    cache: Arc<AgentCache>,
    interval: std::time::Duration,
    flush_interval_secs: i64,
    plugin: &str,
    debug: bool,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => {
                tracing::info!("connection-loop stopping");
                return;
            }
        }

        let hostname = match hostname::get() {
            Ok(h) => h.to_string_lossy().into_owned(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read hostname");
                continue;
            }
        };

        match pull_schedule(&client, &hostname).await {
            Ok(records) => {
                for record in records {
                    cache.set(record);
                }
            }
            Err(err) => tracing::warn!(error = %err, "schedule pull failed"),
        }

        cache.sweep_expired(flush_interval_secs);

        let handles: Vec<_> = cache
            .items()
            .into_iter()
            .filter(|record| record.options.is_active())
            .map(|record| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { netagent::probe::probe_one(record, client).await })
            })
            .collect();

        let mut changed = Vec::new();
        for outcome in futures::future::join_all(handles).await {
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(error = %err, "probe task panicked");
                    continue;
                }
            };
            if debug {
                if let Ok(json) = serde_json::to_string(&outcome.record) {
                    tracing::debug!(%json, "probe result");
                }
            }
            cache.set(outcome.record.clone());
            if outcome.changed {
                changed.push(outcome.record);
            }
        }

        if !changed.is_empty() {
            if let Err(err) = post_status(&client, &changed).await {
                tracing::warn!(error = %err, "status post failed");
            }
        }

        if plugin == "telegraf" || plugin == "windows" {
            let stats = cache.statistics();
            println!("netmap conn_total={},conn_disabled={}", stats.total, stats.disabled);
        }
    }
}

async fn pull_schedule(client: &UrlSet, hostname: &str) -> Result<Vec<SockTable>, anyhow::Error> {
    let path = format!("/api/v1/netmap/records?src_name={hostname}");
    let response = client.request(reqwest::Method::GET, &path, None).await?;
    let envelope: netagent::WireEnvelope<Vec<SockTable>> = serde_json::from_slice(&response.body)?;
    envelope.into_data()
}

async fn post_status(client: &UrlSet, records: &[SockTable]) -> Result<(), anyhow::Error> {
    let body = serde_json::to_vec(records)?;
    client
        .request(reqwest::Method::POST, "/api/v1/netmap/status", Some(&body))
        .await?;
    Ok(())
}

async fn loop_b(
    urls: Vec<String>,
    netstat: netagent::NetstatConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let client_config = ClientConfig::new(urls);
    let client = match UrlSet::new(client_config) {
        Ok(c) => c,
        Err(err) => {
            tracing::error!(error = %err, "failed to build netstat client");
            return;
        }
    };

    let options = Options {
        service: None,
        status: netstat.status.clone(),
        command: if netstat.command.is_empty() { None } else { Some(netstat.command.clone()) },
        timeout: netstat.timeout.as_secs_f64(),
        max_resp_time: 0.0,
        account_id: netstat.account_id,
        active_time: None,
    };

    let mut ticker = tokio::time::interval(netstat.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => {
                tracing::info!("netstat-loop stopping");
                return;
            }
        }

        let hostname = match hostname::get() {
            Ok(h) => h.to_string_lossy().into_owned(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read hostname");
                continue;
            }
        };

        match netagent::netstat::discover(
            &hostname,
            &netstat.ignore_ports,
            &netstat.ignore_hosts,
            &options,
            &client,
            netstat.account_id,
        )
        .await
        {
            Ok(records) if netstat.send && !records.is_empty() => {
                let body = match serde_json::to_vec(&records) {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to encode netstat batch");
                        continue;
                    }
                };
                if let Err(err) = client
                    .request(reqwest::Method::POST, "/api/v1/netmap/netstat", Some(&body))
                    .await
                {
                    tracing::warn!(error = %err, "netstat post failed");
                }
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "netstat discovery failed"),
        }
    }
}

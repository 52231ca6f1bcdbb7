use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::duration;

/// Command-line flags, mirroring the original `netagent` binary's flag set.
#[derive(Debug, clap::Parser)]
#[clap(name = "netagent", version)]
pub struct Args {
    #[clap(long = "config.file", default_value = "config/netmap.toml")]
    pub config_file: PathBuf,

    /// Plugin output mode: empty (daemon), `telegraf`, or `windows`.
    #[clap(long, default_value = "")]
    pub plugin: String,

    #[clap(long, default_value = "info")]
    pub log_filter: String,

    #[clap(long)]
    pub debug: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub global: RawGlobal,
    #[serde(default)]
    pub cache: RawCache,
    #[serde(default)]
    pub netstat: RawNetstat,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawGlobal {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub max_resp_time: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCache {
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub flush_interval: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNetstat {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub send: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub account_id: u32,
    #[serde(default)]
    pub ignore_ports: Vec<u16>,
    #[serde(default)]
    pub ignore_hosts: Vec<String>,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub timeout: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawConnection {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub interval: String,
}

/// Fully resolved configuration, defaults applied and duration strings
/// parsed, matching the original's fallback values.
pub struct Config {
    pub urls: Vec<String>,
    pub max_resp_time: Duration,
    pub cache_limit: usize,
    pub cache_flush_interval: Duration,
    pub netstat: Option<NetstatConfig>,
    pub connections: Vec<ConnectionConfig>,
}

pub struct NetstatConfig {
    pub send: bool,
    pub status: String,
    pub account_id: u32,
    pub ignore_ports: Vec<u16>,
    pub ignore_hosts: Vec<String>,
    pub interval: Duration,
    pub command: String,
    pub timeout: Duration,
}

pub struct ConnectionConfig {
    pub urls: Vec<String>,
    pub username: String,
    pub password: String,
    pub bearer_token: String,
    pub headers: HashMap<String, String>,
    pub command: String,
    pub interval: Duration,
}

impl Config {
    pub fn resolve(raw: RawConfig) -> Result<Self, anyhow::Error> {
        let global_interval = duration::parse(non_empty(&raw.global.interval, "60s"))?;
        let max_resp_time = duration::parse(non_empty(&raw.global.max_resp_time, "10s"))?;
        let cache_limit = if raw.cache.limit == 0 { 1000 } else { raw.cache.limit };
        let cache_flush_interval = duration::parse(non_empty(&raw.cache.flush_interval, "24h"))?;

        let netstat = if raw.netstat.enabled {
            Some(NetstatConfig {
                send: raw.netstat.send,
                status: raw.netstat.status.clone(),
                account_id: raw.netstat.account_id,
                ignore_ports: raw.netstat.ignore_ports.clone(),
                ignore_hosts: raw.netstat.ignore_hosts.clone(),
                interval: duration::parse(non_empty(&raw.netstat.interval, "300s"))?,
                command: raw.netstat.command.clone(),
                timeout: duration::parse(non_empty(&raw.netstat.timeout, "10s"))?,
            })
        } else {
            None
        };

        let connections = raw
            .connections
            .into_iter()
            .map(|c| {
                let interval = if c.interval.is_empty() {
                    global_interval
                } else {
                    duration::parse(&c.interval)?
                };
                Ok(ConnectionConfig {
                    urls: c.urls,
                    username: c.username,
                    password: c.password,
                    bearer_token: c.bearer_token,
                    headers: c.headers,
                    command: c.command,
                    interval,
                })
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;

        Ok(Config {
            urls: raw.global.urls,
            max_resp_time,
            cache_limit,
            cache_flush_interval,
            netstat,
            connections,
        })
    }

    pub fn load(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&contents)?;
        Self::resolve(raw)
    }
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

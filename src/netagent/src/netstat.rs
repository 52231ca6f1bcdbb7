use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use netmap_client::UrlSet;
use netmap_types::{Direction, Exception, Mode, Options, SockAddr, SockTable};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState,
};
use regex::Regex;

const DIAL_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_BATCH: usize = 1000;

/// One discovery tick: fetch the tenant's exception list and merge its
/// `ignoreMask` patterns with the statically configured ignore hosts, then
/// enumerate live sockets, filter, resolve, classify in/out direction, and
/// cap the result at [`MAX_BATCH`].
pub async fn discover(
    hostname: &str,
    ignore_ports: &[u16],
    ignore_host_patterns: &[String],
    options: &Options,
    client: &UrlSet,
    account_id: u32,
) -> Result<Vec<SockTable>, anyhow::Error> {
    let mut patterns = ignore_host_patterns.to_vec();
    patterns.extend(fetch_ignore_masks(client, account_id).await);
    let ignores = compile_patterns(&patterns);

    let sockets = enumerate()?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut udp_skipped = 0usize;

    for socket in sockets {
        if out.len() >= MAX_BATCH {
            tracing::warn!(cap = MAX_BATCH, "netstat discovery batch capped");
            break;
        }
        if matches!(socket.protocol_socket_info, ProtocolSocketInfo::Udp(_)) {
            udp_skipped += 1;
            continue;
        }
        let Some(candidate) = filter_one(socket, ignore_ports) else {
            continue;
        };
        let dedup_key = (candidate.remote.ip(), candidate.remote.port(), candidate.mode);
        if !seen.insert(dedup_key) {
            continue;
        }

        let remote_name = resolve_name(candidate.remote.ip());
        let remote_label = format!("{}:{}", remote_name, candidate.remote.port());
        if ignores.iter().any(|re| re.is_match(&remote_label)) {
            continue;
        }

        if let Some(record) =
            classify(hostname, &remote_name, candidate, options).await
        {
            out.push(record);
        }
    }

    if udp_skipped > 0 {
        tracing::debug!(
            count = udp_skipped,
            "UDP sockets observed but skipped: this host's socket table exposes no remote endpoint for them"
        );
    }

    Ok(out)
}

/// Fetches the exception list scoped to `account_id` and returns the raw
/// `ignoreMask` patterns, to be merged with the statically configured ignore
/// hosts before the ignore check. Any failure (transport, decode, or server
/// error) is logged and treated as an empty list rather than aborting
/// discovery.
async fn fetch_ignore_masks(client: &UrlSet, account_id: u32) -> Vec<String> {
    let path = format!("/api/v1/netmap/exceptions?account_id={account_id}");
    let response = match client.request(reqwest::Method::GET, &path, None).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "exception fetch failed, using statically configured ignore_hosts only");
            return Vec::new();
        }
    };
    let envelope: crate::WireEnvelope<Vec<Exception>> =
        match serde_json::from_slice(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "exception response decode failed");
                return Vec::new();
            }
        };
    match envelope.into_data() {
        Ok(exceptions) => exceptions.into_iter().map(|e| e.ignore_mask).collect(),
        Err(err) => {
            tracing::warn!(error = %err, "exception fetch returned an error envelope");
            Vec::new()
        }
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(&format!("^{pattern}$")) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "invalid ignore host pattern");
                None
            }
        })
        .collect()
}

#[derive(Clone, Copy)]
struct Candidate {
    mode: Mode,
    local: SocketAddr,
    remote: SocketAddr,
}

/// Enumerates both transports from the OS. UDP sockets are enumerated but
/// never turned into candidates: netstat2's `UdpSocketInfo` carries no
/// remote endpoint (UDP socket tables are connectionless, so the kernel has
/// nothing to report there), leaving nothing to dedup or dial against. UDP
/// dependencies still reach the cache the normal way, pushed down from the
/// server's schedule like any other connection — see `discover`'s
/// `udp_skipped` counter for visibility into how many were seen.
fn enumerate() -> Result<Vec<SocketInfo>, anyhow::Error> {
    let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
    let proto_flags = ProtocolFlags::TCP | ProtocolFlags::UDP;
    Ok(netstat2::get_sockets_info(af_flags, proto_flags)?)
}

fn filter_one(socket: SocketInfo, ignore_ports: &[u16]) -> Option<Candidate> {
    let ProtocolSocketInfo::Tcp(tcp) = socket.protocol_socket_info else {
        return None;
    };
    let mode = Mode::Tcp;
    let local = SocketAddr::new(tcp.local_addr, tcp.local_port);
    let remote = SocketAddr::new(tcp.remote_addr, tcp.remote_port);
    let listening = tcp.state == TcpState::Listen;

    if listening {
        return None;
    }
    if remote.ip() == IpAddr::V4(Ipv4Addr::UNSPECIFIED) {
        return None;
    }
    if local.ip() == remote.ip() {
        return None;
    }
    if remote.port() == 0 {
        return None;
    }
    if ignore_ports.contains(&remote.port()) {
        return None;
    }

    Some(Candidate { mode, local, remote })
}

fn resolve_name(ip: IpAddr) -> String {
    match dns_lookup::lookup_addr(&ip) {
        Ok(name) => name.trim_end_matches('.').to_string(),
        Err(_) => ip.to_string(),
    }
}

/// Attempts an outbound dial; on failure, attempts the reverse dial to the
/// local port and emits an `in`-direction record if that succeeds.
async fn classify(
    hostname: &str,
    remote_name: &str,
    candidate: Candidate,
    options: &Options,
) -> Option<SockTable> {
    let outbound = dial(candidate.mode, candidate.remote).await;
    if outbound {
        return Some(build_record(
            hostname,
            remote_name,
            candidate,
            Direction::Out,
            options,
        ));
    }

    let reverse_target = SocketAddr::new(candidate.local.ip(), candidate.local.port());
    if dial(candidate.mode, reverse_target).await {
        let mut swapped = candidate;
        swapped.local = candidate.remote;
        swapped.remote = SocketAddr::new(candidate.local.ip(), candidate.local.port());
        return Some(build_record(
            hostname,
            remote_name,
            swapped,
            Direction::In,
            options,
        ));
    }

    None
}

async fn dial(mode: Mode, addr: SocketAddr) -> bool {
    match mode {
        Mode::Tcp => tokio::time::timeout(DIAL_TIMEOUT, tokio::net::TcpStream::connect(addr))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false),
        Mode::Udp => tokio::time::timeout(DIAL_TIMEOUT, async {
            let socket = tokio::net::UdpSocket::bind((addr.ip(), 0)).await?;
            socket.connect(addr).await
        })
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false),
        Mode::Cmd => false,
    }
}

fn build_record(
    hostname: &str,
    remote_name: &str,
    candidate: Candidate,
    direction: Direction,
    options: &Options,
) -> SockTable {
    let (local_name, remote_label) = match direction {
        Direction::Out => (hostname.to_string(), remote_name.to_string()),
        Direction::In => (remote_name.to_string(), hostname.to_string()),
    };

    SockTable {
        id: String::new(),
        timestamp: 0,
        local_addr: SockAddr::new(candidate.local.ip(), local_name),
        remote_addr: SockAddr::new(candidate.remote.ip(), remote_label),
        relation: netmap_types::Relation {
            mode: candidate.mode.as_str().to_string(),
            port: candidate.remote.port(),
            command: None,
            result: 0,
            response: 0.0,
            trace: 0,
        },
        options: options.clone(),
        kind: Some(direction),
    }
    .with_derived_id()
}

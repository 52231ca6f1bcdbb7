use std::collections::HashMap;

use netmap_types::{Exception, SockTable};

/// Merges records gathered from the local store and every peer's
/// `GetRecords` reply, keeping for each `id` the row with the greatest
/// `timestamp`. Eventual consistency relies on this read-time merge rather
/// than any write-time coordination between peers.
pub fn merge_records(sources: impl IntoIterator<Item = Vec<SockTable>>) -> Vec<SockTable> {
    let mut by_id: HashMap<String, SockTable> = HashMap::new();
    for batch in sources {
        for record in batch {
            by_id
                .entry(record.id.clone())
                .and_modify(|existing| {
                    if record.timestamp > existing.timestamp {
                        *existing = record.clone();
                    }
                })
                .or_insert(record);
        }
    }
    by_id.into_values().collect()
}

/// Exceptions carry no timestamp; a peer either has one or it doesn't, so
/// the merge is a plain union keyed by `id`.
pub fn merge_exceptions(sources: impl IntoIterator<Item = Vec<Exception>>) -> Vec<Exception> {
    let mut by_id: HashMap<String, Exception> = HashMap::new();
    for batch in sources {
        for exception in batch {
            by_id.entry(exception.id.clone()).or_insert(exception);
        }
    }
    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmap_types::{Mode, Options, Relation, SockAddr};
    use std::net::IpAddr;

    fn record(id: &str, timestamp: i64) -> SockTable {
        SockTable {
            id: id.to_string(),
            timestamp,
            local_addr: SockAddr {
                ip: "10.0.0.1".parse::<IpAddr>().unwrap(),
                name: "a".to_string(),
                port: None,
            },
            remote_addr: SockAddr {
                ip: "10.0.0.2".parse::<IpAddr>().unwrap(),
                name: "b".to_string(),
                port: None,
            },
            relation: Relation {
                mode: Mode::Tcp.as_str().to_string(),
                port: 80,
                command: None,
                result: 0,
                response: 0.0,
                trace: 0,
            },
            options: Options {
                service: None,
                status: String::new(),
                command: None,
                timeout: 1.0,
                max_resp_time: 1.0,
                account_id: 1,
                active_time: None,
            },
            kind: None,
        }
    }

    #[test]
    fn merge_keeps_greatest_timestamp() {
        let local = vec![record("x", 10)];
        let peer = vec![record("x", 20)];
        let merged = merge_records([local, peer]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].timestamp, 20);
    }

    #[test]
    fn merge_unions_distinct_ids() {
        let local = vec![record("x", 10)];
        let peer = vec![record("y", 5)];
        let merged = merge_records([local, peer]);
        assert_eq!(merged.len(), 2);
    }
}

use std::collections::HashMap;
use std::sync::Mutex;

use netmap_ore::now::{system_time, NowFn};
use netmap_types::SockTable;

/// Per-process fingerprint cache: the agent's local view of which records it
/// is responsible for probing, distinct from the server-side store. Expiry
/// removes entries the server no longer schedules.
pub struct AgentCache {
    inner: Mutex<HashMap<String, Entry>>,
    limit: usize,
    now: NowFn,
}

struct Entry {
    record: SockTable,
    last_seen: i64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    pub total: usize,
    pub disabled: usize,
}

impl AgentCache {
    pub fn new(limit: usize) -> Self {
        AgentCache {
            inner: Mutex::new(HashMap::new()),
            limit,
            now: system_time(),
        }
    }

    #[cfg(test)]
    pub fn with_clock(limit: usize, now: NowFn) -> Self {
        AgentCache {
            inner: Mutex::new(HashMap::new()),
            limit,
            now,
        }
    }

    /// Upserts `record`, touching `last_seen = now`. Silently refuses to
    /// grow past `limit` on a new id.
    pub fn set(&self, record: SockTable) {
        let mut guard = self.inner.lock().unwrap();
        let now = (self.now)();
        if !guard.contains_key(&record.id) && guard.len() >= self.limit {
            tracing::warn!(id = %record.id, "agent cache full, dropping new record");
            return;
        }
        guard.insert(
            record.id.clone(),
            Entry {
                record,
                last_seen: now,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<SockTable> {
        self.inner.lock().unwrap().get(id).map(|e| e.record.clone())
    }

    pub fn items(&self) -> Vec<SockTable> {
        self.inner.lock().unwrap().values().map(|e| e.record.clone()).collect()
    }

    /// Removes every entry whose `last_seen` predates `now - horizon`.
    pub fn sweep_expired(&self, horizon_secs: i64) {
        let now = (self.now)();
        self.inner
            .lock()
            .unwrap()
            .retain(|_, entry| entry.last_seen >= now - horizon_secs);
    }

    pub fn statistics(&self) -> Statistics {
        let guard = self.inner.lock().unwrap();
        let total = guard.len();
        let disabled = guard.values().filter(|e| !e.record.options.is_active()).count();
        Statistics { total, disabled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmap_types::{Mode, Options, Relation, SockAddr};
    use std::net::IpAddr;
    use std::sync::Arc;

    fn record(id: &str) -> SockTable {
        SockTable {
            id: id.to_string(),
            timestamp: 0,
            local_addr: SockAddr {
                ip: "10.0.0.1".parse::<IpAddr>().unwrap(),
                name: "a".into(),
                port: None,
            },
            remote_addr: SockAddr {
                ip: "10.0.0.2".parse::<IpAddr>().unwrap(),
                name: "b".into(),
                port: None,
            },
            relation: Relation {
                mode: Mode::Tcp.as_str().into(),
                port: 80,
                command: None,
                result: 0,
                response: 0.0,
                trace: 0,
            },
            options: Options::default(),
            kind: None,
        }
    }

    #[test]
    fn expiry_removes_stale_entries() {
        let clock = Arc::new(std::sync::atomic::AtomicI64::new(0));
        let clock_for_closure = Arc::clone(&clock);
        let now: NowFn = Arc::new(move || clock_for_closure.load(std::sync::atomic::Ordering::SeqCst));
        let cache = AgentCache::with_clock(10, now);
        cache.set(record("x"));
        clock.store(1000, std::sync::atomic::Ordering::SeqCst);
        cache.sweep_expired(100);
        assert!(cache.get("x").is_none());
    }

    #[test]
    fn limit_refuses_new_ids_past_cap() {
        let cache = AgentCache::new(1);
        cache.set(record("x"));
        cache.set(record("y"));
        assert_eq!(cache.items().len(), 1);
    }
}

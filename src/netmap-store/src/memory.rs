//! The in-memory reference [`Store`] implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use netmap_ore::now::{system_time, NowFn};
use netmap_types::{ExpArgs, Exception, RecArgs, SockTable};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::Store;

/// Default cap on the number of distinct record ids, matching the original
/// backend's default when no explicit limit is configured.
pub const DEFAULT_LIMIT: usize = 1_000_000;

struct Inner {
    records: HashMap<String, SockTable>,
    /// Index from `local_addr.name` to the set of record ids observed for
    /// that local host, mirroring the original cache's per-agent fast path.
    index: HashMap<String, HashSet<String>>,
    exceptions: HashMap<String, Exception>,
}

impl Inner {
    fn new() -> Self {
        Inner {
            records: HashMap::new(),
            index: HashMap::new(),
            exceptions: HashMap::new(),
        }
    }

    fn index_insert(&mut self, local_name: &str, id: &str) {
        self.index
            .entry(local_name.to_string())
            .or_default()
            .insert(id.to_string());
    }

    fn index_remove(&mut self, local_name: &str, id: &str) {
        if let Some(ids) = self.index.get_mut(local_name) {
            ids.remove(id);
            if ids.is_empty() {
                self.index.remove(local_name);
            }
        }
    }
}

/// A process-local, readers-writer-locked record and exception store.
///
/// No operation holds the lock across I/O: every method takes the lock,
/// mutates the in-memory maps, and releases it before returning.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    limit: usize,
    now: NowFn,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(DEFAULT_LIMIT)
    }
}

impl MemoryStore {
    pub fn new(limit: usize) -> Self {
        MemoryStore {
            inner: RwLock::new(Inner::new()),
            limit,
            now: system_time(),
        }
    }

    /// Builds a store with an injected clock, for deterministic tests.
    pub fn with_clock(limit: usize, now: NowFn) -> Self {
        MemoryStore {
            inner: RwLock::new(Inner::new()),
            limit,
            now,
        }
    }

    fn now(&self) -> i64 {
        (self.now)()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_tables(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load_tables(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn save_status(&self, records: Vec<SockTable>) -> Result<(), StoreError> {
        let now = self.now();
        let mut inner = self.inner.write().await;
        for rec in records {
            if let Some(existing) = inner.records.get_mut(&rec.id) {
                existing.relation = rec.relation;
                existing.timestamp = now;
            }
        }
        Ok(())
    }

    async fn save_netstat(&self, records: Vec<SockTable>) -> Result<(), StoreError> {
        let now = self.now();
        let mut inner = self.inner.write().await;
        for rec in records {
            if let Some(existing) = inner.records.get_mut(&rec.id) {
                existing.timestamp = now;
                continue;
            }
            let local_name = rec.local_addr.name.clone();
            let id = rec.id.clone();
            let mut rec = rec;
            rec.timestamp = now;
            inner.records.insert(id.clone(), rec);
            inner.index_insert(&local_name, &id);
        }
        Ok(())
    }

    async fn save_records(&self, records: Vec<SockTable>) -> Result<(), StoreError> {
        let now = self.now();
        let mut inner = self.inner.write().await;
        for rec in records {
            let is_new = !inner.records.contains_key(&rec.id);
            if is_new && inner.records.len() >= self.limit {
                return Err(StoreError::LimitExceeded);
            }
            let local_name = rec.local_addr.name.clone();
            let id = rec.id.clone();
            let mut rec = rec;
            rec.timestamp = now;
            inner.records.insert(id.clone(), rec);
            inner.index_insert(&local_name, &id);
        }
        Ok(())
    }

    async fn save_tracert(&self, records: Vec<SockTable>) -> Result<(), StoreError> {
        let now = self.now();
        let mut inner = self.inner.write().await;
        for rec in records {
            if let Some(existing) = inner.records.get_mut(&rec.id) {
                existing.relation.trace = netmap_types::model::TRACE_CAPTURED;
                existing.timestamp = now;
                if let Some(command) = rec.options.command {
                    if !command.is_empty() {
                        existing.options.command = Some(command);
                    }
                }
            }
        }
        Ok(())
    }

    async fn load_records(&self, args: RecArgs) -> Result<Vec<SockTable>, StoreError> {
        let inner = self.inner.read().await;

        let candidates: Vec<&SockTable> = if let Some(src_name) = &args.src_name {
            match inner.index.get(src_name) {
                Some(ids) => ids.iter().filter_map(|id| inner.records.get(id)).collect(),
                None => Vec::new(),
            }
        } else {
            inner.records.values().collect()
        };

        let filtered = candidates
            .into_iter()
            .filter(|rec| args.id.as_deref().map_or(true, |id| rec.id == id))
            .filter(|rec| args.kind.map_or(true, |kind| rec.kind == Some(kind)))
            .filter(|rec| {
                args.timestamp
                    .map_or(true, |timestamp| rec.timestamp >= timestamp)
            })
            .filter(|rec| {
                args.account_id
                    .map_or(true, |account_id| rec.options.account_id == account_id)
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn del_records(&self, ids: Vec<String>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            if let Some(rec) = inner.records.remove(&id) {
                inner.index_remove(&rec.local_addr.name, &id);
            }
        }
        Ok(())
    }

    async fn load_exceptions(&self, args: ExpArgs) -> Result<Vec<Exception>, StoreError> {
        let inner = self.inner.read().await;
        let mut result = Vec::new();
        for exc in inner.exceptions.values() {
            if let Some(id) = &args.id {
                if &exc.id != id {
                    continue;
                }
            }
            if let Some(account_id) = args.account_id {
                if exc.account_id != account_id {
                    continue;
                }
            }
            if let Some(src_name) = &args.src_name {
                let matches = regex::Regex::new(&format!("^{}$", exc.host_mask))
                    .map(|re| re.is_match(src_name))
                    .unwrap_or(false);
                if !matches {
                    continue;
                }
            }
            result.push(exc.clone());
        }
        Ok(result)
    }

    async fn save_exceptions(&self, records: Vec<Exception>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for exc in records {
            inner.exceptions.insert(exc.id.clone(), exc);
        }
        Ok(())
    }

    async fn del_exceptions(&self, ids: Vec<String>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            inner.exceptions.remove(&id);
        }
        Ok(())
    }
}

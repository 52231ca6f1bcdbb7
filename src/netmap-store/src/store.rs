use async_trait::async_trait;
use netmap_types::{ExpArgs, Exception, RecArgs, SockTable};

use crate::error::StoreError;

/// A capability set every record/exception backend must honor (in-memory,
/// relational, document, columnar, key-value). The in-memory backend
/// ([`crate::MemoryStore`]) is the reference implementation and the one the
/// test suite in `tests/store.rs` exercises.
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates any schema the backend needs. A no-op for backends with no
    /// schema of their own.
    async fn create_tables(&self) -> Result<(), StoreError>;

    /// Hydrates in-memory indices from persistent rows at startup.
    async fn load_tables(&self) -> Result<(), StoreError>;

    /// Releases any resources held by the backend.
    async fn close(&self) -> Result<(), StoreError>;

    /// For each record whose id exists, overwrites `relation` and sets
    /// `timestamp = now`. Absent ids are skipped silently. Must never create
    /// a row.
    async fn save_status(&self, records: Vec<SockTable>) -> Result<(), StoreError>;

    /// For each record, inserts if absent (`timestamp = now`); if present,
    /// touches `timestamp = now` only. No field is overwritten on an
    /// existing row.
    async fn save_netstat(&self, records: Vec<SockTable>) -> Result<(), StoreError>;

    /// Upserts. `timestamp = now`. Fails the whole batch with
    /// [`StoreError::LimitExceeded`] if inserting a new id would exceed the
    /// configured limit.
    async fn save_records(&self, records: Vec<SockTable>) -> Result<(), StoreError>;

    /// For each existing record, sets `relation.trace = 2` and, if the
    /// incoming row carries a non-empty `options.command`, merges it into
    /// the existing row's `options.command`. Same existence rule as
    /// [`Store::save_status`].
    async fn save_tracert(&self, records: Vec<SockTable>) -> Result<(), StoreError>;

    /// Returns the filtered record set. Uses a secondary index on
    /// `local_addr.name` for the common per-agent query.
    async fn load_records(&self, args: RecArgs) -> Result<Vec<SockTable>, StoreError>;

    /// Deletes by id; missing ids are ignored.
    async fn del_records(&self, ids: Vec<String>) -> Result<(), StoreError>;

    /// Returns exceptions matching `args`, optionally regex-matching
    /// `host_mask` against `args.src_name`.
    async fn load_exceptions(&self, args: ExpArgs) -> Result<Vec<Exception>, StoreError>;

    /// Upserts exceptions by id.
    async fn save_exceptions(&self, records: Vec<Exception>) -> Result<(), StoreError>;

    /// Deletes exceptions by id; missing ids are ignored.
    async fn del_exceptions(&self, ids: Vec<String>) -> Result<(), StoreError>;
}

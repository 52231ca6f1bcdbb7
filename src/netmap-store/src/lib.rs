//! The pluggable record/exception store contract, plus an in-memory
//! reference implementation used by both `netserver`'s default backend and
//! the contract test suite in `tests/store.rs`.

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::{MemoryStore, DEFAULT_LIMIT};
pub use store::Store;

//! The netmap agent: per-connection schedule pull & probe dispatch, plus
//! netstat-driven dependency discovery.

pub mod cache;
pub mod config;
mod duration;
pub mod netstat;
pub mod probe;
pub mod wire;

pub use cache::AgentCache;
pub use config::{Config, ConnectionConfig, NetstatConfig};
pub use wire::WireEnvelope;

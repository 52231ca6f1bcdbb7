//! The record/exception data model.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::id;

/// An endpoint of a [`SockTable`] relation.
///
/// `port` is only meaningful transiently, while netstat discovery is still
/// assembling a candidate record; it is not part of the persisted identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SockAddr {
    pub ip: IpAddr,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl SockAddr {
    pub fn new(ip: IpAddr, name: impl Into<String>) -> Self {
        SockAddr {
            ip,
            name: name.into(),
            port: None,
        }
    }
}

/// Probe mode of a [`Relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Tcp,
    Udp,
    Cmd,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tcp => "tcp",
            Mode::Udp => "udp",
            Mode::Cmd => "cmd",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::error::NetmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Mode::Tcp),
            "udp" => Ok(Mode::Udp),
            "cmd" => Ok(Mode::Cmd),
            other => Err(crate::error::NetmapError::ValidationFailed(format!(
                "unknown relation mode {other:?}"
            ))),
        }
    }
}

/// Probe classification codes for [`Relation::result`].
pub const RESULT_OK: i32 = 0;
pub const RESULT_TIMEOUT: i32 = 1;
pub const RESULT_CONNECT_FAILED: i32 = 2;

/// Traceroute escalation states for [`Relation::trace`].
pub const TRACE_IDLE: i32 = 0;
pub const TRACE_ARMED: i32 = 1;
pub const TRACE_CAPTURED: i32 = 2;

/// The probe and its last observed outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub mode: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub result: i32,
    #[serde(default)]
    pub response: f64,
    #[serde(default)]
    pub trace: i32,
}

/// Per-record operator configuration, inherited from agent/netstat config at
/// discovery time and carried along with the record thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Empty string means active; non-empty disables probing.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub timeout: f64,
    #[serde(default)]
    pub max_resp_time: f64,
    #[serde(default)]
    pub account_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_time: Option<i64>,
}

impl Options {
    pub fn is_active(&self) -> bool {
        self.status.is_empty()
    }
}

/// Direction of a discovered connection relative to the observing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// A directed dependency between two hosts on a specific transport/port,
/// plus its last probe outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SockTable {
    pub id: String,
    #[serde(default)]
    pub timestamp: i64,
    pub local_addr: SockAddr,
    pub remote_addr: SockAddr,
    pub relation: Relation,
    #[serde(default)]
    pub options: Options,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Direction>,
}

impl SockTable {
    /// Recomputes `id` from the record's natural key.
    pub fn with_derived_id(mut self) -> Self {
        self.id = id::record_id(
            &self.local_addr.ip,
            &self.remote_addr.ip,
            &self.relation.mode,
            self.relation.port,
        );
        self
    }

    /// Checks the mandatory fields a POSTed record must carry.
    pub fn validate(&self) -> Result<(), crate::error::NetmapError> {
        if self.local_addr.name.is_empty() {
            return Err(crate::error::NetmapError::ValidationFailed(
                "localAddr.name is required".into(),
            ));
        }
        if self.remote_addr.name.is_empty() {
            return Err(crate::error::NetmapError::ValidationFailed(
                "remoteAddr.name is required".into(),
            ));
        }
        if self.relation.port == 0 {
            return Err(crate::error::NetmapError::ValidationFailed(
                "relation.port is required".into(),
            ));
        }
        if self.relation.mode.is_empty() {
            return Err(crate::error::NetmapError::ValidationFailed(
                "relation.mode is required".into(),
            ));
        }
        Ok(())
    }
}

/// A regex rule suppressing discovery of certain remote endpoints for a
/// tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    pub id: String,
    pub account_id: u32,
    pub host_mask: String,
    pub ignore_mask: String,
}

impl Exception {
    pub fn with_derived_id(mut self) -> Self {
        self.id = id::exception_id(self.account_id, &self.host_mask, &self.ignore_mask);
        self
    }
}

/// Filter arguments for [`crate::Store::load_records`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "src_name", skip_serializing_if = "Option::is_none")]
    pub src_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, alias = "account_id", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u32>,
}

/// Filter arguments for [`crate::Store::load_exceptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "account_id", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u32>,
    #[serde(default, alias = "src_name", skip_serializing_if = "Option::is_none")]
    pub src_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SockTable {
        SockTable {
            id: String::new(),
            timestamp: 0,
            local_addr: SockAddr::new("10.0.0.1".parse().unwrap(), "h1"),
            remote_addr: SockAddr::new("10.0.0.2".parse().unwrap(), "h2"),
            relation: Relation {
                mode: "tcp".into(),
                port: 443,
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
    fn derived_id_ignores_host_names() {
        let a = sample().with_derived_id();
        let mut renamed = sample();
        renamed.local_addr.name = "h1b".into();
        renamed.remote_addr.name = "h2b".into();
        let b = renamed.with_derived_id();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut rec = sample();
        rec.local_addr.name.clear();
        assert!(rec.validate().is_err());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let rec = sample().with_derived_id();
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("localAddr").is_some());
        assert!(json.get("remoteAddr").is_some());
        assert!(json.get("relation").is_some());
    }
}

use std::net::IpAddr;

use netmap_types::{Direction, ExpArgs, Exception, Options, RecArgs, Relation, SockAddr, SockTable};
use thiserror::Error;

use crate::pb;

/// An error converting between wire (protobuf) and domain representations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("invalid ip address {0:?}")]
    InvalidIp(String),
    #[error("invalid direction {0:?}")]
    InvalidDirection(String),
}

impl From<ConvertError> for netmap_types::NetmapError {
    fn from(err: ConvertError) -> Self {
        netmap_types::NetmapError::DecodeFailed(err.to_string())
    }
}

fn parse_direction(s: &str) -> Result<Direction, ConvertError> {
    match s {
        "in" => Ok(Direction::In),
        "out" => Ok(Direction::Out),
        other => Err(ConvertError::InvalidDirection(other.to_string())),
    }
}

fn direction_str(d: Direction) -> &'static str {
    match d {
        Direction::In => "in",
        Direction::Out => "out",
    }
}

impl From<SockAddr> for pb::SockAddr {
    fn from(a: SockAddr) -> Self {
        pb::SockAddr {
            ip: a.ip.to_string(),
            name: a.name,
            port: a.port.map(u32::from),
        }
    }
}

impl TryFrom<pb::SockAddr> for SockAddr {
    type Error = ConvertError;

    fn try_from(a: pb::SockAddr) -> Result<Self, Self::Error> {
        let ip: IpAddr = a
            .ip
            .parse()
            .map_err(|_| ConvertError::InvalidIp(a.ip.clone()))?;
        Ok(SockAddr {
            ip,
            name: a.name,
            port: a.port.map(|p| p as u16),
        })
    }
}

impl From<Relation> for pb::Relation {
    fn from(r: Relation) -> Self {
        pb::Relation {
            mode: r.mode,
            port: r.port as u32,
            command: r.command,
            result: r.result,
            response: r.response,
            trace: r.trace,
        }
    }
}

impl From<pb::Relation> for Relation {
    fn from(r: pb::Relation) -> Self {
        Relation {
            mode: r.mode,
            port: r.port as u16,
            command: r.command,
            result: r.result,
            response: r.response,
            trace: r.trace,
        }
    }
}

impl From<Options> for pb::Options {
    fn from(o: Options) -> Self {
        pb::Options {
            service: o.service,
            status: o.status,
            command: o.command,
            timeout: o.timeout,
            max_resp_time: o.max_resp_time,
            account_id: o.account_id,
            active_time: o.active_time,
        }
    }
}

impl From<pb::Options> for Options {
    fn from(o: pb::Options) -> Self {
        Options {
            service: o.service,
            status: o.status,
            command: o.command,
            timeout: o.timeout,
            max_resp_time: o.max_resp_time,
            account_id: o.account_id,
            active_time: o.active_time,
        }
    }
}

impl From<SockTable> for pb::SockTable {
    fn from(r: SockTable) -> Self {
        pb::SockTable {
            id: r.id,
            timestamp: r.timestamp,
            local_addr: Some(r.local_addr.into()),
            remote_addr: Some(r.remote_addr.into()),
            relation: Some(r.relation.into()),
            options: Some(r.options.into()),
            kind: r.kind.map(direction_str).map(str::to_string),
        }
    }
}

impl TryFrom<pb::SockTable> for SockTable {
    type Error = ConvertError;

    fn try_from(r: pb::SockTable) -> Result<Self, Self::Error> {
        Ok(SockTable {
            id: r.id,
            timestamp: r.timestamp,
            local_addr: r
                .local_addr
                .ok_or(ConvertError::MissingField("local_addr"))?
                .try_into()?,
            remote_addr: r
                .remote_addr
                .ok_or(ConvertError::MissingField("remote_addr"))?
                .try_into()?,
            relation: r
                .relation
                .ok_or(ConvertError::MissingField("relation"))?
                .into(),
            options: r.options.map(Options::from).unwrap_or_default(),
            kind: r.kind.as_deref().map(parse_direction).transpose()?,
        })
    }
}

impl From<Exception> for pb::Exception {
    fn from(e: Exception) -> Self {
        pb::Exception {
            id: e.id,
            account_id: e.account_id,
            host_mask: e.host_mask,
            ignore_mask: e.ignore_mask,
        }
    }
}

impl From<pb::Exception> for Exception {
    fn from(e: pb::Exception) -> Self {
        Exception {
            id: e.id,
            account_id: e.account_id,
            host_mask: e.host_mask,
            ignore_mask: e.ignore_mask,
        }
    }
}

impl From<RecArgs> for pb::RecArgs {
    fn from(a: RecArgs) -> Self {
        pb::RecArgs {
            id: a.id,
            src_name: a.src_name,
            kind: a.kind.map(direction_str).map(str::to_string),
            timestamp: a.timestamp,
            account_id: a.account_id,
        }
    }
}

impl TryFrom<pb::RecArgs> for RecArgs {
    type Error = ConvertError;

    fn try_from(a: pb::RecArgs) -> Result<Self, Self::Error> {
        Ok(RecArgs {
            id: a.id,
            src_name: a.src_name,
            kind: a.kind.as_deref().map(parse_direction).transpose()?,
            timestamp: a.timestamp,
            account_id: a.account_id,
        })
    }
}

impl From<ExpArgs> for pb::ExpArgs {
    fn from(a: ExpArgs) -> Self {
        pb::ExpArgs {
            id: a.id,
            account_id: a.account_id,
            src_name: a.src_name,
        }
    }
}

impl From<pb::ExpArgs> for ExpArgs {
    fn from(a: pb::ExpArgs) -> Self {
        ExpArgs {
            id: a.id,
            account_id: a.account_id,
            src_name: a.src_name,
        }
    }
}

impl From<Vec<SockTable>> for pb::RecordList {
    fn from(records: Vec<SockTable>) -> Self {
        pb::RecordList {
            records: records.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<pb::RecordList> for Vec<SockTable> {
    type Error = ConvertError;

    fn try_from(list: pb::RecordList) -> Result<Self, Self::Error> {
        list.records.into_iter().map(TryFrom::try_from).collect()
    }
}

impl From<Vec<Exception>> for pb::ExceptionList {
    fn from(exceptions: Vec<Exception>) -> Self {
        pb::ExceptionList {
            exceptions: exceptions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<pb::ExceptionList> for Vec<Exception> {
    fn from(list: pb::ExceptionList) -> Self {
        list.exceptions.into_iter().map(Into::into).collect()
    }
}

impl From<Vec<String>> for pb::IdList {
    fn from(ids: Vec<String>) -> Self {
        pb::IdList { ids }
    }
}

impl From<pb::IdList> for Vec<String> {
    fn from(list: pb::IdList) -> Self {
        list.ids
    }
}

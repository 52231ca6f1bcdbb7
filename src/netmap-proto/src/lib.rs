//! Generated protobuf types for the peer RPC surface, plus `From`/`TryFrom`
//! conversions to and from `netmap_types`'s domain model.
//!
//! Conversions are plain trait impls rather than a bespoke `RustType`/
//! `ProtoType` pair: the RPC surface here is a handful of unary calls, not a
//! dataflow command/response protocol, so the simpler shape is enough.

pub mod pb {
    tonic::include_proto!("netmap");
}

mod convert;

pub use convert::ConvertError;

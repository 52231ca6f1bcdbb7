//! A peer RPC client and server wrapping tonic. The generated service has
//! one method per record/exception store operation plus a `Healthy` probe,
//! all plain unary calls.

mod client;
mod server;

pub use client::GrpcClient;
pub use server::GrpcServer;

//! Shared HTTP plumbing reused by every axum surface in the workspace.

mod cors;
mod envelope;
mod handlers;

pub use cors::build_cors_allowed_origin;
pub use envelope::{error_response, error_response_for, Envelope};
pub use handlers::{handle_liveness_check, handle_prometheus};

//! Core data model, identity hashing, and error taxonomy shared by every
//! netmap crate.

pub mod error;
pub mod id;
pub mod model;

pub use error::NetmapError;
pub use model::{
    Direction, ExpArgs, Exception, Mode, Options, RecArgs, Relation, SockAddr, SockTable,
};

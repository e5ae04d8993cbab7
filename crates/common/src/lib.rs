//! Common protocol constants, wire types, and errors shared across the responder crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;

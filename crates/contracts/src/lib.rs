//! # Contracts
//!
//! Frozen interface contracts shared by every relay crate: the configuration
//! model, header and status sets, and the message source trait.
//! Business crates depend on this crate only; reverse dependencies are
//! prohibited.

mod blueprint;
mod endpoint;
mod error;
mod headers;
mod source;
mod status;

pub use blueprint::*;
pub use endpoint::{endpoint_url, parse_endpoint};
pub use error::*;
pub use headers::HeaderSet;
pub use source::{LocalMessageSource, MessageSource, SourceEvent};
pub use status::AcceptableStatusSet;

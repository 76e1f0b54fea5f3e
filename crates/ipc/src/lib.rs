//! Message protocol for Vektor's off-thread tessellation
//!
//! Defines the request/response pair exchanged between the interactive
//! thread and the tessellation worker. This is the only serialization
//! boundary of the stroke core: both sides must tolerate empty or absent
//! buffers as a valid "no geometry" result.

mod error;
mod messages;

pub use error::IpcError;
pub use messages::{ContourPoint, TessRequest, TessResponse, WindingRule};

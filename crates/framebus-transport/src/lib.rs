//! Message-oriented transport capability for framebus.
//!
//! Frame delivery and discovery are written against the trait family in
//! [`traits`], never against a concrete socket type. The traits capture the
//! four capabilities the upper layers need:
//! - atomic multi-part messages,
//! - a broadcast pattern (fan out to all current subscribers, non-blocking,
//!   no delivery guarantee),
//! - an addressed pattern (inbound messages tagged with a stable
//!   per-connection [`EndpointId`], replies routed back to it),
//! - bounded readiness polling via [`Timeout`].
//!
//! [`MemTransport`] is the in-process reference implementation used by tests,
//! examples and single-process pipelines. Any substrate with the same
//! semantics can implement the traits instead.

pub mod error;
pub mod mem;
pub mod timeout;
pub mod traits;

pub use error::{Result, TransportError};
pub use mem::{MemTransport, MemTransportConfig};
pub use timeout::{Deadline, Timeout};
pub use traits::{
    EndpointId, Multipart, PublishSocket, RequestSocket, RespondSocket, SubscribeSocket, Transport,
};

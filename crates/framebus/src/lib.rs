//! Streaming structured image frames over message transports.
//!
//! framebus moves [`Frame`]s — image descriptors, raw pixel buffers and an
//! opaque user payload — from one producer to one or more consumers, with a
//! choice of delivery contract, and ships a small directory service so
//! consumers can locate producers without hard-coded addresses.
//!
//! # Crate Structure
//!
//! - [`transport`] — Message-transport capability traits and the in-process
//!   [`MemTransport`](transport::MemTransport) reference implementation
//! - [`wire`] — The multi-part wire format for frames and service records
//! - [`peer`] — Fast (broadcast, loss-tolerant) and reliable (quorum-gated,
//!   loss-free) delivery entities (behind `peer` feature)
//! - [`discovery`] — Directory server and client stub (behind `discovery`
//!   feature)
//!
//! [`Frame`]: wire::Frame

/// Re-export transport types.
pub mod transport {
    pub use framebus_transport::*;
}

/// Re-export wire format types.
pub mod wire {
    pub use framebus_wire::*;
}

/// Re-export delivery entities (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use framebus_peer::*;
}

/// Re-export discovery types (requires `discovery` feature).
#[cfg(feature = "discovery")]
pub mod discovery {
    pub use framebus_discovery::*;
}

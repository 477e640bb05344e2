//! Frame delivery entities.
//!
//! Two delivery models with opposite trade-offs, both speaking the
//! `framebus-wire` format over any [`framebus_transport::Transport`]:
//!
//! - **fast** ([`FastProducer`] / [`FastConsumer`]): broadcast fan-out.
//!   Publishing never blocks and never checks who is listening; a slow,
//!   late or disconnected consumer misses frames. Best for live streams
//!   where the next frame supersedes the last.
//! - **reliable** ([`ReliableProducer`] / [`ReliableConsumer`]): quorum
//!   gated. Consumers signal readiness per receive attempt; a publish waits
//!   until enough distinct consumers are ready (or a deadline passes) and
//!   then serves every ready consumer individually, or nobody at all.
//!
//! Callers that only need "something that produces frames" program against
//! the [`FrameProducer`] / [`FrameConsumer`] traits.

pub mod error;
pub mod fast;
pub mod reliable;
pub mod traits;

pub use error::{PeerError, Result};
pub use fast::{FastConsumer, FastProducer};
pub use reliable::{ReliableConsumer, ReliableProducer};
pub use traits::{FrameConsumer, FrameProducer, ProtocolIdentity};

/// Default image transport endpoint.
pub const DEFAULT_IMAGE_ADDRESS: &str = "tcp://127.0.0.1:5562";

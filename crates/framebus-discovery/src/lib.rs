//! Directory service for locating producers without hard-coded addresses.
//!
//! A [`DiscoveryServer`] holds an in-memory list of [`ServiceRecord`]s and
//! answers `register` / `unregister` / `find` requests; a
//! [`DiscoveryClient`] is the stateless stub participants use to talk to
//! it. Requests tagged with a foreign protocol version are dropped without
//! a reply — the requester's own timeout is its only failure signal.
//!
//! Records are held in memory only; nothing survives a server restart, and
//! there is no expiry or heartbeat. A participant that goes away without
//! unregistering stays listed.
//!
//! [`ServiceRecord`]: framebus_wire::ServiceRecord

pub mod client;
pub mod error;
pub mod record;
pub mod server;

pub use client::DiscoveryClient;
pub use error::{DiscoveryError, Result};
pub use record::{consumer_record, producer_record};
pub use server::DiscoveryServer;

/// Default directory endpoint.
pub const DEFAULT_DISCOVERY_ADDRESS: &str = "tcp://127.0.0.1:6000";

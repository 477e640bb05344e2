use std::fmt;

use bytes::Bytes;

use crate::error::Result;
use crate::timeout::Timeout;

/// One atomic multi-part message.
///
/// Parts of one message are delivered together and in order or not at all;
/// there is no interleaving with other messages on the same connection.
pub type Multipart = Vec<Bytes>;

/// Opaque transport-assigned token identifying one connection.
///
/// Used to route replies back to the originator and, in reliable delivery,
/// as the quorum-membership key. It has no meaning outside the lifetime of
/// the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(u64);

impl EndpointId {
    /// Wrap a transport-internal identity value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint-{}", self.0)
    }
}

/// A context owning transport resources and opening sockets against textual
/// `scheme://host:port` addresses.
pub trait Transport {
    type Publisher: PublishSocket;
    type Subscriber: SubscribeSocket;
    type Responder: RespondSocket;
    type Requester: RequestSocket;

    /// Bind a broadcast publisher endpoint.
    fn bind_publisher(&self, address: &str) -> Result<Self::Publisher>;

    /// Connect a subscriber to a broadcast endpoint, subscribed to everything.
    fn connect_subscriber(&self, address: &str) -> Result<Self::Subscriber>;

    /// Bind an addressed responder endpoint.
    fn bind_responder(&self, address: &str) -> Result<Self::Responder>;

    /// Connect a requester to an addressed endpoint.
    fn connect_requester(&self, address: &str) -> Result<Self::Requester>;
}

/// Broadcast sender: fan out to all current subscribers.
///
/// Sending never blocks and never fails for lack of subscribers; a slow
/// subscriber silently misses messages.
pub trait PublishSocket {
    fn send(&mut self, message: Multipart) -> Result<()>;
}

/// Broadcast receiver.
pub trait SubscribeSocket {
    /// Wait up to `timeout` for a pending message. `Ok(true)` means `recv`
    /// will yield one without blocking.
    fn poll(&mut self, timeout: Timeout) -> Result<bool>;

    /// Take the next pending message.
    fn recv(&mut self) -> Result<Multipart>;
}

/// Addressed receiver: each inbound message is tagged with the stable
/// identity of its sender, and replies are routed explicitly.
pub trait RespondSocket {
    fn poll(&mut self, timeout: Timeout) -> Result<bool>;

    fn recv(&mut self) -> Result<(EndpointId, Multipart)>;

    /// Send to one previously seen peer. A peer that has since disconnected
    /// is skipped silently, matching broadcast-side loss semantics.
    fn send_to(&mut self, peer: &EndpointId, message: Multipart) -> Result<()>;
}

/// Addressed sender with a single implicit peer (the bound responder).
pub trait RequestSocket {
    fn send(&mut self, message: Multipart) -> Result<()>;

    fn poll(&mut self, timeout: Timeout) -> Result<bool>;

    fn recv(&mut self) -> Result<Multipart>;
}

/// Errors that can occur while publishing or receiving frames.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] framebus_transport::TransportError),

    /// Wire-format error.
    #[error("wire error: {0}")]
    Wire(#[from] framebus_wire::WireError),

    /// Nothing arrived within the allowed wait.
    #[error("no frame within the allowed wait")]
    TimedOut,

    /// Too few consumers signalled readiness before the deadline. The frame
    /// was sent to nobody.
    #[error("quorum shortfall: {ready} of {required} consumers ready")]
    QuorumShortfall { ready: usize, required: usize },
}

pub type Result<T> = std::result::Result<T, PeerError>;

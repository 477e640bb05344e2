/// Errors that can occur while talking to the directory.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] framebus_transport::TransportError),

    /// Wire-format error.
    #[error("wire error: {0}")]
    Wire(#[from] framebus_wire::WireError),

    /// No reply within the allowed wait. Also what a requester sees when
    /// the directory silently dropped its request over a version mismatch.
    #[error("no directory reply within the allowed wait")]
    TimedOut,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

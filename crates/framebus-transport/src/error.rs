/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Another socket is already bound to this address.
    #[error("address already bound: {address}")]
    AddressInUse { address: String },

    /// The address is in use by a socket of the other messaging pattern.
    #[error("address {address} is bound to a different messaging pattern")]
    PatternMismatch { address: String },

    /// `recv` was called with no message pending.
    #[error("no message pending on socket")]
    Empty,
}

pub type Result<T> = std::result::Result<T, TransportError>;

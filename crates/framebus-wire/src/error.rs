/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The message ended before the expected part sequence was complete.
    #[error("message truncated: ran out of parts before the end marker")]
    Truncated,

    /// A textual token could not be parsed.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// An incoming payload did not fit the preallocated receive buffer.
    /// The truncated prefix has been written; the remainder is lost.
    #[error("payload of {len} bytes exceeds receive buffer capacity {capacity}")]
    BufferOverflow { len: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;

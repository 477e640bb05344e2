use bytes::Bytes;

use crate::image::{ImageDescriptor, PixelBuffer};

/// One logical unit of transmitted image data.
///
/// A frame is a pure value: an ordered run of descriptors, an ordered run of
/// pixel buffers and one opaque user payload. Descriptor and buffer counts
/// are independent — one descriptor may describe many buffers, or none.
/// There is no frame identity or sequence number at this layer; callers that
/// need sequencing encode it inside `user_data`.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub descriptors: Vec<ImageDescriptor>,
    pub buffers: Vec<PixelBuffer>,
    pub user_data: Bytes,
}

impl Frame {
    /// Empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame from its three sections.
    pub fn from_parts(
        descriptors: Vec<ImageDescriptor>,
        buffers: Vec<PixelBuffer>,
        user_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            descriptors,
            buffers,
            user_data: user_data.into(),
        }
    }
}

/// Per-call switches that suppress frame sections.
///
/// Each switch applies symmetrically: on send the section is omitted (an
/// empty user-data part, or a zero element count); on receive the section is
/// discarded without being retained. Nothing is skipped by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitOptions {
    pub skip_descriptors: bool,
    pub skip_data: bool,
    pub skip_user_data: bool,
}

impl TransmitOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

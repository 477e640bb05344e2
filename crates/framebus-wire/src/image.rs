use bytes::Bytes;

use crate::error::{Result, WireError};

/// Shape and format metadata for one image.
///
/// Purely descriptive: the codec never validates a descriptor against the
/// pixel buffer it nominally describes — that contract belongs to the
/// caller. Field values are whatever the sender put there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageDescriptor {
    /// Resolution in the x dimension.
    pub width: u32,
    /// Resolution in the y dimension.
    pub height: u32,
    /// Number of channels.
    pub channels: u32,
    /// Bytes per channel.
    pub bytes_per_channel: u32,
    /// Image name. Must not contain whitespace (tokens are
    /// whitespace-delimited on the wire).
    pub name: String,
}

impl ImageDescriptor {
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        bytes_per_channel: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            channels,
            bytes_per_channel,
            name: name.into(),
        }
    }

    /// Total number of bytes this format describes.
    pub fn total_bytes(&self) -> u64 {
        u64::from(self.width)
            * u64::from(self.height)
            * u64::from(self.channels)
            * u64::from(self.bytes_per_channel)
    }
}

/// One image's raw pixel data.
///
/// Two construction modes with deliberately distinct semantics:
///
/// - **shared** ([`PixelBuffer::from_shared`]): wraps a reference-counted
///   [`Bytes`]; cloning increments the count, so any number of logical
///   buffers can alias one allocation without copying.
/// - **preallocated** ([`PixelBuffer::with_capacity`]): fixed-size storage
///   owned by the caller, used as a receive target. A receive writes
///   directly into it; a payload larger than the capacity is truncated to
///   fit and reported as [`WireError::BufferOverflow`]. Cloning a
///   preallocated buffer duplicates its bytes.
///
/// Bytes are carried in sender-defined order; no conversion is applied.
#[derive(Debug, Clone, Default)]
pub struct PixelBuffer {
    storage: Storage,
}

#[derive(Debug, Clone)]
enum Storage {
    Shared(Bytes),
    Preallocated(Box<[u8]>),
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Shared(Bytes::new())
    }
}

impl PixelBuffer {
    /// Empty shared buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared buffer over reference-counted content.
    pub fn from_shared(content: impl Into<Bytes>) -> Self {
        Self {
            storage: Storage::Shared(content.into()),
        }
    }

    /// Fixed-capacity receive target, zero-initialized.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Storage::Preallocated(vec![0u8; capacity].into_boxed_slice()),
        }
    }

    /// Number of bytes held (for a preallocated buffer, its capacity).
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Shared(bytes) => bytes.len(),
            Storage::Preallocated(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this buffer is a fixed-capacity receive target.
    pub fn is_preallocated(&self) -> bool {
        matches!(self.storage, Storage::Preallocated(_))
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Shared(bytes) => bytes,
            Storage::Preallocated(buf) => buf,
        }
    }

    /// Content as a cheaply cloneable `Bytes` (copies for preallocated
    /// storage).
    pub fn to_shared(&self) -> Bytes {
        match &self.storage {
            Storage::Shared(bytes) => bytes.clone(),
            Storage::Preallocated(buf) => Bytes::copy_from_slice(buf),
        }
    }

    /// Receive one wire part into this buffer.
    ///
    /// Shared buffers adopt the part without copying. Preallocated buffers
    /// take the payload in place: a payload longer than the capacity is cut
    /// to fit and reported as an overflow after the prefix is written.
    pub(crate) fn fill_from(&mut self, part: Bytes) -> Result<()> {
        match &mut self.storage {
            Storage::Shared(bytes) => {
                *bytes = part;
                Ok(())
            }
            Storage::Preallocated(buf) => {
                let fit = part.len().min(buf.len());
                buf[..fit].copy_from_slice(&part[..fit]);
                if part.len() > buf.len() {
                    Err(WireError::BufferOverflow {
                        len: part.len(),
                        capacity: buf.len(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<Vec<u8>> for PixelBuffer {
    fn from(content: Vec<u8>) -> Self {
        Self::from_shared(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_total_bytes() {
        let descriptor = ImageDescriptor::new(640, 480, 3, 1, "rgb");
        assert_eq!(descriptor.total_bytes(), 640 * 480 * 3);
    }

    #[test]
    fn descriptor_total_bytes_does_not_overflow_u32() {
        let descriptor = ImageDescriptor::new(u32::MAX, 2, 2, 2, "huge");
        assert_eq!(descriptor.total_bytes(), u64::from(u32::MAX) * 8);
    }

    #[test]
    fn shared_clone_aliases_content() {
        let original = PixelBuffer::from_shared(vec![1u8, 2, 3]);
        let alias = original.clone();
        assert_eq!(original.as_slice(), alias.as_slice());
        // Bytes clones share the same backing allocation
        assert_eq!(
            original.to_shared().as_ptr(),
            alias.to_shared().as_ptr()
        );
    }

    #[test]
    fn preallocated_fill_within_capacity() {
        let mut target = PixelBuffer::with_capacity(4);
        target.fill_from(Bytes::from_static(b"ab")).unwrap();
        assert_eq!(&target.as_slice()[..2], b"ab");
        assert_eq!(target.len(), 4);
        assert!(target.is_preallocated());
    }

    #[test]
    fn preallocated_fill_truncates_and_fails_on_overflow() {
        let mut target = PixelBuffer::with_capacity(3);
        let err = target.fill_from(Bytes::from_static(b"abcdef")).unwrap_err();
        assert!(matches!(
            err,
            WireError::BufferOverflow {
                len: 6,
                capacity: 3
            }
        ));
        assert_eq!(target.as_slice(), b"abc");
    }

    #[test]
    fn shared_fill_adopts_part_without_copy() {
        let mut target = PixelBuffer::new();
        let part = Bytes::from_static(b"payload");
        target.fill_from(part.clone()).unwrap();
        assert_eq!(target.as_slice(), b"payload");
        assert_eq!(target.to_shared().as_ptr(), part.as_ptr());
    }
}

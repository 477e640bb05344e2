//! Multi-part wire format for image frames and service records.
//!
//! This is the codec layer of framebus: it turns a [`Frame`] into one atomic
//! multi-part message and back, with no semantic interpretation of the bytes
//! it carries. The shape of an encoded frame is:
//!
//! ```text
//! user_data
//! descriptor_count, descriptor*
//! buffer_count, buffer*
//! end marker (empty part)
//! ```
//!
//! Scalars travel as whitespace-delimited text tokens, one value set per
//! part; pixel buffers travel as raw bytes in sender byte order — no
//! endianness conversion is ever performed.

pub mod codec;
pub mod error;
pub mod frame;
pub mod image;
pub mod record;

pub use codec::{
    decode_bool, decode_count, decode_descriptor, decode_frame, decode_record, decode_string,
    encode_bool, encode_count, encode_descriptor, encode_frame, encode_record, encode_string,
    PartReader,
};
pub use error::{Result, WireError};
pub use frame::{Frame, TransmitOptions};
pub use image::{ImageDescriptor, PixelBuffer};
pub use record::{
    ProtocolKind, ServiceRecord, DISCOVERY_PROTOCOL_VERSION, IMAGE_PROTOCOL_VERSION,
};

use bytes::Bytes;
use framebus_transport::Multipart;

use crate::error::{Result, WireError};
use crate::frame::{Frame, TransmitOptions};
use crate::image::{ImageDescriptor, PixelBuffer};
use crate::record::{ProtocolKind, ServiceRecord};

/// Cursor over the parts of one received multi-part message.
///
/// Exhaustion is [`WireError::Truncated`], never a blocking wait: the whole
/// message was received atomically before decoding starts, so a short part
/// sequence is a protocol error, not a transient condition.
pub struct PartReader {
    parts: std::vec::IntoIter<Bytes>,
}

impl PartReader {
    pub fn new(message: Multipart) -> Self {
        Self {
            parts: message.into_iter(),
        }
    }

    /// Take the next part.
    pub fn next_part(&mut self) -> Result<Bytes> {
        self.parts.next().ok_or(WireError::Truncated)
    }

    /// Take the next part and throw it away.
    pub fn discard(&mut self) -> Result<()> {
        self.next_part().map(drop)
    }
}

/// Encode a boolean as a single textual part (`"1"` / `"0"`).
pub fn encode_bool(value: bool) -> Bytes {
    Bytes::from_static(if value { b"1" } else { b"0" })
}

pub fn decode_bool(part: &Bytes) -> Result<bool> {
    match text(part)?.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(WireError::MalformedToken(format!(
            "expected boolean 0/1, got {other:?}"
        ))),
    }
}

/// Encode an element count as a single textual part.
pub fn encode_count(count: usize) -> Bytes {
    Bytes::from(count.to_string())
}

pub fn decode_count(part: &Bytes) -> Result<usize> {
    let token = text(part)?.trim();
    token
        .parse()
        .map_err(|_| WireError::MalformedToken(format!("expected count, got {token:?}")))
}

/// Encode a free string as its own part.
pub fn encode_string(value: &str) -> Bytes {
    Bytes::copy_from_slice(value.as_bytes())
}

pub fn decode_string(part: &Bytes) -> Result<String> {
    text(part).map(str::to_string)
}

/// Encode a descriptor as one part of whitespace-separated tokens:
/// `width height channels bytes_per_channel name`.
pub fn encode_descriptor(descriptor: &ImageDescriptor) -> Bytes {
    Bytes::from(format!(
        "{} {} {} {} {}",
        descriptor.width,
        descriptor.height,
        descriptor.channels,
        descriptor.bytes_per_channel,
        descriptor.name
    ))
}

pub fn decode_descriptor(part: &Bytes) -> Result<ImageDescriptor> {
    let text = text(part)?;
    let mut tokens = text.split_whitespace();
    let mut field = |label: &str| -> Result<u32> {
        let token = tokens
            .next()
            .ok_or_else(|| WireError::MalformedToken(format!("descriptor missing {label}")))?;
        token
            .parse()
            .map_err(|_| WireError::MalformedToken(format!("descriptor {label}: {token:?}")))
    };
    let width = field("width")?;
    let height = field("height")?;
    let channels = field("channels")?;
    let bytes_per_channel = field("bytes_per_channel")?;
    // an absent name token decodes as the empty name
    let name = tokens.next().unwrap_or("").to_string();
    Ok(ImageDescriptor {
        width,
        height,
        channels,
        bytes_per_channel,
        name,
    })
}

/// Encode a service record as one part:
/// `name address version kind-code`.
pub fn encode_record(record: &ServiceRecord) -> Bytes {
    Bytes::from(format!(
        "{} {} {} {}",
        record.name,
        record.address,
        record.version,
        record.kind.code()
    ))
}

pub fn decode_record(part: &Bytes) -> Result<ServiceRecord> {
    let text = text(part)?;
    let mut tokens = text.split_whitespace();
    let mut field = |label: &str| -> Result<String> {
        tokens
            .next()
            .map(str::to_string)
            .ok_or_else(|| WireError::MalformedToken(format!("record missing {label}")))
    };
    let name = field("name")?;
    let address = field("address")?;
    let version = field("version")?;
    let code = field("kind")?;
    let code: u32 = code
        .parse()
        .map_err(|_| WireError::MalformedToken(format!("record kind: {code:?}")))?;
    Ok(ServiceRecord {
        name,
        address,
        version,
        kind: ProtocolKind::from_code(code),
    })
}

/// Encode a frame as one atomic multi-part message.
///
/// Skipped sections are emitted as an empty user-data part or a zero count;
/// the trailing end marker is always present.
pub fn encode_frame(frame: &Frame, options: &TransmitOptions) -> Multipart {
    let descriptor_count = if options.skip_descriptors {
        0
    } else {
        frame.descriptors.len()
    };
    let buffer_count = if options.skip_data {
        0
    } else {
        frame.buffers.len()
    };

    let mut parts = Vec::with_capacity(4 + descriptor_count + buffer_count);

    if options.skip_user_data {
        parts.push(Bytes::new());
    } else {
        parts.push(frame.user_data.clone());
    }

    parts.push(encode_count(descriptor_count));
    for descriptor in &frame.descriptors[..descriptor_count] {
        parts.push(encode_descriptor(descriptor));
    }

    parts.push(encode_count(buffer_count));
    for buffer in &frame.buffers[..buffer_count] {
        parts.push(buffer.to_shared());
    }

    // end marker
    parts.push(Bytes::new());

    parts
}

/// Decode one received message into `frame`.
///
/// Sections skipped by `options` are discarded from the message and left
/// empty in the destination. Buffer elements are received into the existing
/// destination buffers where present — a preallocated element takes the
/// payload in place (truncating oversized payloads) — and adopt the message
/// part as shared content otherwise.
///
/// Element-level failures (a malformed descriptor token, a preallocated
/// buffer overflow) do not abort the walk: the remaining sections are still
/// consumed so the decode always ends at the message boundary, and the first
/// failure is reported afterwards. Running out of parts is fatal
/// immediately.
pub fn decode_frame(
    message: Multipart,
    frame: &mut Frame,
    options: &TransmitOptions,
) -> Result<()> {
    let mut reader = PartReader::new(message);
    let mut first_error: Option<WireError> = None;

    // user data
    let part = reader.next_part()?;
    if options.skip_user_data {
        frame.user_data = Bytes::new();
    } else {
        frame.user_data = part;
    }

    // descriptors
    let count = decode_count(&reader.next_part()?)?;
    let keep = if options.skip_descriptors { 0 } else { count };
    frame.descriptors.clear();
    for _ in 0..keep {
        let part = reader.next_part()?;
        match decode_descriptor(&part) {
            Ok(descriptor) => frame.descriptors.push(descriptor),
            Err(error) => {
                first_error.get_or_insert(error);
                frame.descriptors.push(ImageDescriptor::default());
            }
        }
    }
    for _ in keep..count {
        reader.discard()?;
    }

    // pixel buffers
    let count = decode_count(&reader.next_part()?)?;
    let keep = if options.skip_data { 0 } else { count };
    for index in 0..keep {
        let part = reader.next_part()?;
        if index < frame.buffers.len() {
            if let Err(error) = frame.buffers[index].fill_from(part) {
                first_error.get_or_insert(error);
            }
        } else {
            frame.buffers.push(PixelBuffer::from_shared(part));
        }
    }
    frame.buffers.truncate(keep);
    for _ in keep..count {
        reader.discard()?;
    }

    // end marker; its absence is tolerated since the message boundary is
    // already atomic
    let _ = reader.discard();

    match first_error {
        Some(error) => {
            tracing::debug!(%error, "frame decoded with element-level failure");
            Err(error)
        }
        None => Ok(()),
    }
}

fn text(part: &Bytes) -> Result<&str> {
    std::str::from_utf8(part)
        .map_err(|_| WireError::MalformedToken("part is not valid UTF-8".to_string()))
}

/// Image transport protocol version. Peers must match exactly.
pub const IMAGE_PROTOCOL_VERSION: &str = "1";

/// Discovery protocol version. Independent of the image version; requests
/// carrying a different tag are dropped by the directory without a reply.
pub const DISCOVERY_PROTOCOL_VERSION: &str = "1";

/// Protocol family spoken by a network entity.
///
/// Codes 0-2 are reserved for the built-in families; user-defined protocols
/// conventionally start at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolKind {
    /// Fast fan-out image delivery.
    FastImage,
    /// Quorum-gated reliable image delivery.
    ReliableImage,
    /// Directory registration and lookup.
    Discovery,
    /// User-defined protocol family.
    Other(u32),
}

impl ProtocolKind {
    /// First code available to user-defined protocols.
    pub const USER_CODE_START: u32 = 100;

    /// Wire code for this kind.
    pub fn code(self) -> u32 {
        match self {
            ProtocolKind::FastImage => 0,
            ProtocolKind::ReliableImage => 1,
            ProtocolKind::Discovery => 2,
            ProtocolKind::Other(code) => code,
        }
    }

    /// Kind for a wire code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => ProtocolKind::FastImage,
            1 => ProtocolKind::ReliableImage,
            2 => ProtocolKind::Discovery,
            other => ProtocolKind::Other(other),
        }
    }
}

impl Default for ProtocolKind {
    fn default() -> Self {
        ProtocolKind::Other(Self::USER_CODE_START)
    }
}

/// A directory entry: who serves what, where, speaking which version.
///
/// Created by a participant wishing to register, held only in the
/// directory's in-memory registry, removed on explicit unregister. All
/// fields are whitespace-free tokens on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRecord {
    /// Service name used for lookup.
    pub name: String,
    /// Endpoint address, `scheme://host:port`. A wildcard in `find` queries.
    pub address: String,
    /// Protocol version tag.
    pub version: String,
    /// Protocol family.
    pub kind: ProtocolKind,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        kind: ProtocolKind,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            version: version.into(),
            kind,
        }
    }
}

impl Default for ServiceRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            version: IMAGE_PROTOCOL_VERSION.to_string(),
            kind: ProtocolKind::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_roundtrip() {
        for kind in [
            ProtocolKind::FastImage,
            ProtocolKind::ReliableImage,
            ProtocolKind::Discovery,
            ProtocolKind::Other(214),
        ] {
            assert_eq!(ProtocolKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn reserved_codes_decode_to_builtin_kinds() {
        assert_eq!(ProtocolKind::from_code(0), ProtocolKind::FastImage);
        assert_eq!(ProtocolKind::from_code(1), ProtocolKind::ReliableImage);
        assert_eq!(ProtocolKind::from_code(2), ProtocolKind::Discovery);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_serde_roundtrip() {
        let record = ServiceRecord::new(
            "camera",
            "tcp://127.0.0.1:5562",
            ProtocolKind::FastImage,
            IMAGE_PROTOCOL_VERSION,
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: ServiceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

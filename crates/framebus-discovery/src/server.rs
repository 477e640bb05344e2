use bytes::Bytes;
use framebus_peer::ProtocolIdentity;
use framebus_transport::{Multipart, RespondSocket, Timeout, Transport};
use framebus_wire::{
    decode_record, decode_string, encode_bool, encode_count, encode_record, PartReader,
    ProtocolKind, ServiceRecord, DISCOVERY_PROTOCOL_VERSION,
};
use tracing::debug;

use crate::error::Result;

/// In-memory service directory.
///
/// Registrations are appended unconditionally — the directory enforces no
/// uniqueness on names or addresses — and are removed only by an explicit
/// `unregister` for their address. `find` matches name, protocol kind and
/// version exactly; the address field of a query is a wildcard.
pub struct DiscoveryServer<S> {
    socket: S,
    address: String,
    records: Vec<ServiceRecord>,
}

impl<S: RespondSocket> DiscoveryServer<S> {
    /// Bind the directory endpoint.
    pub fn bind<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Responder = S>,
    {
        let socket = transport.bind_responder(address)?;
        Ok(Self {
            socket,
            address: address.to_string(),
            records: Vec::new(),
        })
    }

    /// Drain and answer every pending request.
    ///
    /// The first wait is bounded by `timeout`; once a request has been
    /// handled the queue is re-polled without waiting until it is empty.
    /// Returns the number of requests answered. Requests with a foreign
    /// version tag or an unknown kind are dropped without a reply and are
    /// not counted.
    pub fn process_events(&mut self, timeout: Timeout) -> Result<usize> {
        let mut answered = 0;
        let mut can_read = self.socket.poll(timeout)?;
        while can_read {
            let (peer, message) = self.socket.recv()?;
            if let Some(reply) = self.dispatch(message) {
                self.socket.send_to(&peer, reply)?;
                answered += 1;
            }
            can_read = self.socket.poll(Timeout::Immediate)?;
        }
        Ok(answered)
    }

    /// Currently registered records, in registration order.
    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    /// The bound endpoint address.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn dispatch(&mut self, message: Multipart) -> Option<Multipart> {
        let mut reader = PartReader::new(message);
        let version = decode_string(&reader.next_part().ok()?).ok()?;
        if version != DISCOVERY_PROTOCOL_VERSION {
            debug!(%version, "dropping request with foreign version tag");
            return None;
        }
        let request = decode_string(&reader.next_part().ok()?).ok()?;
        let record = decode_record(&reader.next_part().ok()?).ok()?;

        match request.as_str() {
            "register" => {
                debug!(name = %record.name, address = %record.address, "register");
                self.records.push(record);
                Some(vec![encode_bool(true)])
            }
            "unregister" => {
                debug!(address = %record.address, "unregister");
                self.records.retain(|known| known.address != record.address);
                Some(vec![encode_bool(true)])
            }
            "find" => {
                let found: Vec<&ServiceRecord> = self
                    .records
                    .iter()
                    .filter(|known| {
                        known.name == record.name
                            && known.kind == record.kind
                            && known.version == record.version
                    })
                    .collect();

                let mut reply = Vec::with_capacity(found.len() + 3);
                reply.push(encode_bool(!found.is_empty()));
                reply.push(encode_count(found.len()));
                for known in found {
                    reply.push(encode_record(known));
                }
                reply.push(Bytes::new());
                Some(reply)
            }
            _ => None,
        }
    }
}

impl<S: RespondSocket> ProtocolIdentity for DiscoveryServer<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Discovery
    }

    fn protocol_version(&self) -> &'static str {
        DISCOVERY_PROTOCOL_VERSION
    }
}

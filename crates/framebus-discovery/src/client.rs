use framebus_peer::ProtocolIdentity;
use framebus_transport::{RequestSocket, Timeout, Transport};
use framebus_wire::{
    decode_bool, decode_count, decode_record, encode_record, encode_string, PartReader,
    ProtocolKind, ServiceRecord, DISCOVERY_PROTOCOL_VERSION,
};

use crate::error::{DiscoveryError, Result};

/// Stateless directory stub.
///
/// Each call sends one request and waits up to its timeout for the reply.
/// Silence — including the directory dropping a version-mismatched request
/// — surfaces as [`DiscoveryError::TimedOut`], which is distinct from an
/// explicit `false` or empty reply.
pub struct DiscoveryClient<S> {
    socket: S,
}

impl<S: RequestSocket> DiscoveryClient<S> {
    /// Connect to a directory endpoint.
    pub fn connect<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Requester = S>,
    {
        let socket = transport.connect_requester(address)?;
        Ok(Self { socket })
    }

    /// Register a service record.
    pub fn register(&mut self, record: &ServiceRecord, timeout: Timeout) -> Result<bool> {
        self.request("register", record)?;
        self.boolean_reply(timeout)
    }

    /// Remove every record registered under the record's address.
    pub fn unregister(&mut self, record: &ServiceRecord, timeout: Timeout) -> Result<bool> {
        self.request("unregister", record)?;
        self.boolean_reply(timeout)
    }

    /// Find records matching the query's name, kind and version. The
    /// query's address is ignored by the directory. An empty result is a
    /// successful "nothing registered" answer.
    pub fn find(&mut self, query: &ServiceRecord, timeout: Timeout) -> Result<Vec<ServiceRecord>> {
        self.request("find", query)?;

        if !self.socket.poll(timeout)? {
            return Err(DiscoveryError::TimedOut);
        }
        let mut reader = PartReader::new(self.socket.recv()?);
        let _any_found = decode_bool(&reader.next_part()?)?;
        let count = decode_count(&reader.next_part()?)?;
        let mut found = Vec::new();
        for _ in 0..count {
            found.push(decode_record(&reader.next_part()?)?);
        }
        Ok(found)
    }

    fn request(&mut self, kind: &str, record: &ServiceRecord) -> Result<()> {
        self.socket.send(vec![
            encode_string(DISCOVERY_PROTOCOL_VERSION),
            encode_string(kind),
            encode_record(record),
        ])?;
        Ok(())
    }

    fn boolean_reply(&mut self, timeout: Timeout) -> Result<bool> {
        if !self.socket.poll(timeout)? {
            return Err(DiscoveryError::TimedOut);
        }
        let mut reader = PartReader::new(self.socket.recv()?);
        Ok(decode_bool(&reader.next_part()?)?)
    }
}

impl<S: RequestSocket> ProtocolIdentity for DiscoveryClient<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Discovery
    }

    fn protocol_version(&self) -> &'static str {
        DISCOVERY_PROTOCOL_VERSION
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use framebus_transport::MemTransport;

    use super::*;
    use crate::server::DiscoveryServer;

    const ADDR: &str = "tcp://127.0.0.1:6000";
    const WAIT: Timeout = Timeout::Bounded(std::time::Duration::from_millis(500));

    fn record(name: &str, address: &str, kind: ProtocolKind) -> ServiceRecord {
        ServiceRecord::new(name, address, kind, "1")
    }

    /// Run `body` against a directory server pumping events in a thread.
    fn with_directory(body: impl FnOnce(&MemTransport)) {
        let transport = MemTransport::new();
        let mut server = DiscoveryServer::bind(&transport, ADDR).unwrap();
        let (stop, stopped) = mpsc::channel::<()>();

        let pump = thread::spawn(move || {
            while stopped.try_recv().is_err() {
                server.process_events(Timeout::from_millis(5)).unwrap();
            }
        });

        body(&transport);

        stop.send(()).unwrap();
        pump.join().unwrap();
    }

    #[test]
    fn register_then_find_returns_the_record() {
        with_directory(|transport| {
            let mut client = DiscoveryClient::connect(transport, ADDR).unwrap();
            let camera = record("camera", "tcp://127.0.0.1:5562", ProtocolKind::FastImage);

            assert!(client.register(&camera, WAIT).unwrap());

            let query = record("camera", "ignored", ProtocolKind::FastImage);
            let found = client.find(&query, WAIT).unwrap();
            assert_eq!(found, vec![camera]);
        });
    }

    #[test]
    fn find_with_mismatched_kind_returns_empty() {
        with_directory(|transport| {
            let mut client = DiscoveryClient::connect(transport, ADDR).unwrap();
            let camera = record("camera", "tcp://127.0.0.1:5562", ProtocolKind::FastImage);
            assert!(client.register(&camera, WAIT).unwrap());

            let query = record("camera", "ignored", ProtocolKind::ReliableImage);
            assert!(client.find(&query, WAIT).unwrap().is_empty());
        });
    }

    #[test]
    fn unregister_removes_by_address() {
        with_directory(|transport| {
            let mut client = DiscoveryClient::connect(transport, ADDR).unwrap();
            let camera = record("camera", "tcp://127.0.0.1:5562", ProtocolKind::FastImage);
            assert!(client.register(&camera, WAIT).unwrap());

            assert!(client.unregister(&camera, WAIT).unwrap());

            let query = record("camera", "ignored", ProtocolKind::FastImage);
            assert!(client.find(&query, WAIT).unwrap().is_empty());
        });
    }

    #[test]
    fn unregister_of_unknown_address_still_replies_true() {
        with_directory(|transport| {
            let mut client = DiscoveryClient::connect(transport, ADDR).unwrap();
            let ghost = record("ghost", "tcp://127.0.0.1:9999", ProtocolKind::FastImage);
            assert!(client.unregister(&ghost, WAIT).unwrap());
        });
    }

    #[test]
    fn absent_directory_surfaces_as_timeout() {
        let transport = MemTransport::new();
        let mut client = DiscoveryClient::connect(&transport, ADDR).unwrap();
        let camera = record("camera", "tcp://127.0.0.1:5562", ProtocolKind::FastImage);

        let err = client
            .register(&camera, Timeout::from_millis(20))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::TimedOut));
    }
}

use framebus_peer::{FrameConsumer, FrameProducer};
use framebus_wire::ServiceRecord;

/// Describe a live producer for registration: its bound address, protocol
/// kind and version under the given service name.
pub fn producer_record(name: &str, producer: &impl FrameProducer) -> ServiceRecord {
    ServiceRecord::new(
        name,
        producer.address(),
        producer.protocol_kind(),
        producer.protocol_version(),
    )
}

/// Describe a live consumer. Consumers have no bound address; the address
/// field is a placeholder and never matched by `find`.
pub fn consumer_record(name: &str, consumer: &impl FrameConsumer) -> ServiceRecord {
    ServiceRecord::new(
        name,
        "unused",
        consumer.protocol_kind(),
        consumer.protocol_version(),
    )
}

#[cfg(test)]
mod tests {
    use framebus_peer::{FastConsumer, FastProducer, ReliableProducer};
    use framebus_transport::MemTransport;
    use framebus_wire::{ProtocolKind, IMAGE_PROTOCOL_VERSION};

    use super::*;

    #[test]
    fn producer_record_carries_bound_address_and_identity() {
        let transport = MemTransport::new();
        let producer = FastProducer::bind(&transport, "tcp://127.0.0.1:5562").unwrap();

        let record = producer_record("camera", &producer);
        assert_eq!(record.name, "camera");
        assert_eq!(record.address, "tcp://127.0.0.1:5562");
        assert_eq!(record.kind, ProtocolKind::FastImage);
        assert_eq!(record.version, IMAGE_PROTOCOL_VERSION);
    }

    #[test]
    fn reliable_producer_record_reports_reliable_kind() {
        let transport = MemTransport::new();
        let producer = ReliableProducer::bind(&transport, "tcp://127.0.0.1:5563").unwrap();

        let record = producer_record("depth", &producer);
        assert_eq!(record.kind, ProtocolKind::ReliableImage);
    }

    #[test]
    fn consumer_record_uses_placeholder_address() {
        let transport = MemTransport::new();
        let consumer = FastConsumer::connect(&transport, "tcp://127.0.0.1:5562").unwrap();

        let record = consumer_record("viewer", &consumer);
        assert_eq!(record.address, "unused");
        assert_eq!(record.kind, ProtocolKind::FastImage);
    }
}

//! Reliable delivery with directory lookup.
//!
//! Run with:
//!   cargo run --example reliable-discovery --features discovery
//!
//! A producer registers itself with the directory under a service name; the
//! consumer finds the address through the directory instead of hard-coding
//! it, then receives a handful of frames losslessly.

use std::sync::mpsc;
use std::thread;

use framebus::discovery::{
    producer_record, DiscoveryClient, DiscoveryServer, DEFAULT_DISCOVERY_ADDRESS,
};
use framebus::peer::{ReliableConsumer, ReliableProducer, DEFAULT_IMAGE_ADDRESS};
use framebus::transport::{MemTransport, Timeout};
use framebus::wire::{Frame, ImageDescriptor, PixelBuffer, ProtocolKind, ServiceRecord,
    TransmitOptions, IMAGE_PROTOCOL_VERSION};

const FRAMES: usize = 5;
const SERVICE: &str = "depth-camera";

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let transport = MemTransport::new();

    // directory pump
    let (stop, stopped) = mpsc::channel::<()>();
    let directory = {
        let transport = transport.clone();
        thread::spawn(move || {
            let mut server = DiscoveryServer::bind(&transport, DEFAULT_DISCOVERY_ADDRESS)
                .expect("directory bind");
            while stopped.try_recv().is_err() {
                let _ = server.process_events(Timeout::from_millis(5));
            }
        })
    };

    let mut producer = ReliableProducer::bind(&transport, DEFAULT_IMAGE_ADDRESS)?;
    let mut registrar = DiscoveryClient::connect(&transport, DEFAULT_DISCOVERY_ADDRESS)?;
    registrar.register(&producer_record(SERVICE, &producer), Timeout::from_millis(500))?;
    eprintln!("[producer] registered as {SERVICE:?}");

    let consumer = {
        let transport = transport.clone();
        thread::spawn(move || -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
            let mut finder = DiscoveryClient::connect(&transport, DEFAULT_DISCOVERY_ADDRESS)?;
            let query = ServiceRecord::new(
                SERVICE,
                "",
                ProtocolKind::ReliableImage,
                IMAGE_PROTOCOL_VERSION,
            );
            let found = finder.find(&query, Timeout::from_millis(500))?;
            let address = &found.first().ok_or("service not registered")?.address;
            eprintln!("[consumer] found {SERVICE:?} at {address}");

            let mut consumer = ReliableConsumer::connect(&transport, address)?;
            let mut frame = Frame::new();
            for _ in 0..FRAMES {
                consumer.receive(&mut frame, Timeout::Forever, &TransmitOptions::default())?;
                eprintln!(
                    "[consumer] {}",
                    String::from_utf8_lossy(&frame.user_data)
                );
            }
            Ok(FRAMES)
        })
    };

    for sequence in 0..FRAMES {
        let frame = Frame::from_parts(
            vec![ImageDescriptor::new(640, 480, 1, 2, "depth")],
            vec![PixelBuffer::from_shared(vec![0u8; 640 * 480 * 2])],
            format!("depth-frame-{sequence}").into_bytes(),
        );
        // wait for the consumer's readiness signal, then serve it
        producer.publish(&frame, Timeout::Forever, 1, &TransmitOptions::default())?;
    }

    let received = consumer.join().expect("consumer thread panicked")?;
    eprintln!("[producer] served {received} frames without loss");

    stop.send(())?;
    directory.join().expect("directory thread panicked");
    Ok(())
}

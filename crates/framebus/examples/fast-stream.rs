//! Fast-model stream — a producer fans out frames while a consumer polls.
//!
//! Run with:
//!   cargo run --example fast-stream --features peer
//!
//! The consumer is deliberately slower than the producer; the gap between
//! published and received counts is the fast model's loss in action.

use std::thread;
use std::time::Duration;

use framebus::peer::{FastConsumer, FastProducer, DEFAULT_IMAGE_ADDRESS};
use framebus::transport::{MemTransport, MemTransportConfig, Timeout};
use framebus::wire::{Frame, ImageDescriptor, PixelBuffer, TransmitOptions};

const FRAMES: usize = 50;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // a tiny subscriber queue makes the loss visible
    let transport = MemTransport::with_config(MemTransportConfig {
        subscriber_queue_capacity: 8,
    });
    let mut producer = FastProducer::bind(&transport, DEFAULT_IMAGE_ADDRESS)?;

    let consumer_transport = transport.clone();
    let consumer = thread::spawn(move || -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let mut consumer = FastConsumer::connect(&consumer_transport, DEFAULT_IMAGE_ADDRESS)?;
        let mut received = 0;
        let mut frame = Frame::new();

        while consumer
            .receive(&mut frame, Timeout::from_millis(200), &TransmitOptions::default())
            .is_ok()
        {
            received += 1;
            eprintln!(
                "[consumer] {} ({} bytes)",
                String::from_utf8_lossy(&frame.user_data),
                frame.buffers.iter().map(PixelBuffer::len).sum::<usize>()
            );
            // simulate slow processing
            thread::sleep(Duration::from_millis(2));
        }
        Ok(received)
    });

    // let the consumer subscribe before the first frame goes out
    thread::sleep(Duration::from_millis(20));

    for sequence in 0..FRAMES {
        let frame = Frame::from_parts(
            vec![ImageDescriptor::new(320, 240, 3, 1, "rgb")],
            vec![PixelBuffer::from_shared(vec![0u8; 320 * 240 * 3])],
            format!("frame-{sequence}").into_bytes(),
        );
        producer.publish(&frame, &TransmitOptions::default())?;
    }
    eprintln!("[producer] published {FRAMES} frames");

    let received = consumer.join().expect("consumer thread panicked")?;
    eprintln!("[consumer] received {received} of {FRAMES} frames");
    Ok(())
}

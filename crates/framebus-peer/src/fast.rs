use framebus_transport::{PublishSocket, SubscribeSocket, Timeout, Transport};
use framebus_wire::{
    decode_frame, encode_frame, Frame, ProtocolKind, TransmitOptions, IMAGE_PROTOCOL_VERSION,
};
use tracing::debug;

use crate::error::{PeerError, Result};
use crate::traits::{FrameConsumer, FrameProducer, ProtocolIdentity};

/// Broadcast frame producer.
///
/// `publish` is fire-and-forget: the frame fans out to whoever is currently
/// subscribed, without blocking and without any delivery guarantee. A
/// producer with zero consumers publishes into the void and succeeds.
pub struct FastProducer<S> {
    socket: S,
    address: String,
}

impl<S: PublishSocket> FastProducer<S> {
    /// Bind a broadcast endpoint.
    pub fn bind<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Publisher = S>,
    {
        let socket = transport.bind_publisher(address)?;
        debug!(address, "fast producer up");
        Ok(Self {
            socket,
            address: address.to_string(),
        })
    }

    /// Publish one frame to all current subscribers.
    pub fn publish(&mut self, frame: &Frame, options: &TransmitOptions) -> Result<()> {
        self.socket.send(encode_frame(frame, options))?;
        Ok(())
    }

    /// The bound endpoint address.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl<S: PublishSocket> ProtocolIdentity for FastProducer<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::FastImage
    }

    fn protocol_version(&self) -> &'static str {
        IMAGE_PROTOCOL_VERSION
    }
}

impl<S: PublishSocket> FrameProducer for FastProducer<S> {
    fn publish(
        &mut self,
        frame: &Frame,
        _timeout: Timeout,
        _min_ready: usize,
        options: &TransmitOptions,
    ) -> Result<()> {
        FastProducer::publish(self, frame, options)
    }

    fn address(&self) -> &str {
        FastProducer::address(self)
    }
}

/// Best-effort frame consumer.
///
/// Frames published while the consumer is not actively polling are lost;
/// that is the fast model's contract, not a defect.
pub struct FastConsumer<S> {
    socket: S,
}

impl<S: SubscribeSocket> FastConsumer<S> {
    /// Connect to a producer's broadcast endpoint, subscribed to everything.
    pub fn connect<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Subscriber = S>,
    {
        let socket = transport.connect_subscriber(address)?;
        debug!(address, "fast consumer up");
        Ok(Self { socket })
    }

    /// Receive the next pending frame into `frame`.
    ///
    /// Waits up to `timeout` for something to arrive; `Timeout::Immediate`
    /// turns this into a non-blocking check.
    pub fn receive(
        &mut self,
        frame: &mut Frame,
        timeout: Timeout,
        options: &TransmitOptions,
    ) -> Result<()> {
        if !self.socket.poll(timeout)? {
            return Err(PeerError::TimedOut);
        }
        decode_frame(self.socket.recv()?, frame, options)?;
        Ok(())
    }
}

impl<S: SubscribeSocket> ProtocolIdentity for FastConsumer<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::FastImage
    }

    fn protocol_version(&self) -> &'static str {
        IMAGE_PROTOCOL_VERSION
    }
}

impl<S: SubscribeSocket> FrameConsumer for FastConsumer<S> {
    fn receive(
        &mut self,
        frame: &mut Frame,
        timeout: Timeout,
        options: &TransmitOptions,
    ) -> Result<()> {
        FastConsumer::receive(self, frame, timeout, options)
    }
}

use std::collections::HashSet;

use bytes::Bytes;
use framebus_transport::{
    Deadline, EndpointId, RequestSocket, RespondSocket, Timeout, Transport,
};
use framebus_wire::{
    decode_frame, encode_frame, Frame, ProtocolKind, TransmitOptions, IMAGE_PROTOCOL_VERSION,
};
use tracing::debug;

use crate::error::{PeerError, Result};
use crate::traits::{FrameConsumer, FrameProducer, ProtocolIdentity};

/// Quorum-gated frame producer.
///
/// Consumers announce themselves with a readiness signal per receive
/// attempt; `publish` waits until enough distinct consumers are ready, then
/// serves an individually addressed copy to *every* consumer that signalled
/// during the wait — not just the first `min_ready`. With several consumers
/// on one connection a publish round therefore lasts as long as its slowest
/// ready consumer's send; that throughput cost is the price of loss-free
/// delivery, and is not special-cased away.
///
/// Readiness is keyed purely by connection identity: there is no round
/// token, so a consumer whose receive attempt times out leaves a stale
/// signal behind that the next publish will count. Genuinely loss-free
/// operation needs one connection per logical consumer.
pub struct ReliableProducer<S> {
    socket: S,
    address: String,
}

impl<S: RespondSocket> ReliableProducer<S> {
    /// Bind an addressed endpoint.
    pub fn bind<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Responder = S>,
    {
        let socket = transport.bind_responder(address)?;
        debug!(address, "reliable producer up");
        Ok(Self {
            socket,
            address: address.to_string(),
        })
    }

    /// Publish one frame to every consumer that is ready.
    ///
    /// Blocks until at least `min_ready` distinct consumers have signalled
    /// readiness or `timeout` expires. Readiness arriving in the final wait
    /// still counts: the quorum is re-checked after every drain. On
    /// shortfall nobody receives anything and
    /// [`PeerError::QuorumShortfall`] is returned.
    pub fn publish(
        &mut self,
        frame: &Frame,
        timeout: Timeout,
        min_ready: usize,
        options: &TransmitOptions,
    ) -> Result<()> {
        let mut ready: HashSet<EndpointId> = HashSet::new();
        let deadline = Deadline::start(timeout);

        loop {
            while self.socket.poll(Timeout::Immediate)? {
                let (peer, _signal) = self.socket.recv()?;
                ready.insert(peer);
            }
            if ready.len() >= min_ready {
                break;
            }
            let wait = deadline.remaining();
            if wait == Timeout::Immediate {
                break;
            }
            self.socket.poll(wait)?;
        }

        if ready.len() < min_ready {
            return Err(PeerError::QuorumShortfall {
                ready: ready.len(),
                required: min_ready,
            });
        }

        let message = encode_frame(frame, options);
        for peer in &ready {
            self.socket.send_to(peer, message.clone())?;
        }
        debug!(served = ready.len(), "frame published");
        Ok(())
    }

    /// The bound endpoint address.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl<S: RespondSocket> ProtocolIdentity for ReliableProducer<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::ReliableImage
    }

    fn protocol_version(&self) -> &'static str {
        IMAGE_PROTOCOL_VERSION
    }
}

impl<S: RespondSocket> FrameProducer for ReliableProducer<S> {
    fn publish(
        &mut self,
        frame: &Frame,
        timeout: Timeout,
        min_ready: usize,
        options: &TransmitOptions,
    ) -> Result<()> {
        ReliableProducer::publish(self, frame, timeout, min_ready, options)
    }

    fn address(&self) -> &str {
        ReliableProducer::address(self)
    }
}

/// Readiness-signalling frame consumer.
///
/// Each `receive` call sends exactly one readiness signal before waiting.
/// A receive that times out is not retracted: the signal stays queued at
/// the producer until the next publish drains it. One logical consumer per
/// connection — sharing a connection multiplexes identities and breaks the
/// producer's quorum accounting.
pub struct ReliableConsumer<S> {
    socket: S,
}

impl<S: RequestSocket> ReliableConsumer<S> {
    /// Connect to a producer's addressed endpoint.
    pub fn connect<T>(transport: &T, address: &str) -> Result<Self>
    where
        T: Transport<Requester = S>,
    {
        let socket = transport.connect_requester(address)?;
        debug!(address, "reliable consumer up");
        Ok(Self { socket })
    }

    /// Signal readiness, then receive the next frame into `frame`.
    pub fn receive(
        &mut self,
        frame: &mut Frame,
        timeout: Timeout,
        options: &TransmitOptions,
    ) -> Result<()> {
        // readiness signal: one empty message
        self.socket.send(vec![Bytes::new()])?;

        if !self.socket.poll(timeout)? {
            return Err(PeerError::TimedOut);
        }
        decode_frame(self.socket.recv()?, frame, options)?;
        Ok(())
    }
}

impl<S: RequestSocket> ProtocolIdentity for ReliableConsumer<S> {
    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::ReliableImage
    }

    fn protocol_version(&self) -> &'static str {
        IMAGE_PROTOCOL_VERSION
    }
}

impl<S: RequestSocket> FrameConsumer for ReliableConsumer<S> {
    fn receive(
        &mut self,
        frame: &mut Frame,
        timeout: Timeout,
        options: &TransmitOptions,
    ) -> Result<()> {
        ReliableConsumer::receive(self, frame, timeout, options)
    }
}

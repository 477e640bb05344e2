use framebus_transport::Timeout;
use framebus_wire::{Frame, ProtocolKind, TransmitOptions};

use crate::error::Result;

/// Reports which protocol family and version an entity speaks.
///
/// Version tags must match exactly between peers; there is no negotiation.
pub trait ProtocolIdentity {
    fn protocol_kind(&self) -> ProtocolKind;
    fn protocol_version(&self) -> &'static str;
}

/// Produces frames for connected consumers.
///
/// One signature covers both delivery models: the fast model ignores
/// `timeout` and `min_ready` (publishing is fire-and-forget), the reliable
/// model uses them to gate the quorum wait.
pub trait FrameProducer: ProtocolIdentity {
    fn publish(
        &mut self,
        frame: &Frame,
        timeout: Timeout,
        min_ready: usize,
        options: &TransmitOptions,
    ) -> Result<()>;

    /// The bound endpoint address.
    fn address(&self) -> &str;
}

/// Consumes frames from a producer.
pub trait FrameConsumer: ProtocolIdentity {
    /// Receive the next frame into `frame`, waiting up to `timeout`.
    fn receive(
        &mut self,
        frame: &mut Frame,
        timeout: Timeout,
        options: &TransmitOptions,
    ) -> Result<()>;
}

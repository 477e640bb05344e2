use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::timeout::{Deadline, Timeout};
use crate::traits::{
    EndpointId, Multipart, PublishSocket, RequestSocket, RespondSocket, SubscribeSocket, Transport,
};

/// In-process transport hub.
///
/// Addresses are opaque keys; sockets created from clones of the same
/// `MemTransport` find each other by address string. Connecting before the
/// peer binds is legal: the slot is created lazily and messages queue until
/// the binder arrives. Dropping any socket releases its queues without
/// blocking (zero-linger).
#[derive(Clone, Default)]
pub struct MemTransport {
    hub: Arc<Hub>,
}

/// Tuning knobs for [`MemTransport`].
#[derive(Debug, Clone)]
pub struct MemTransportConfig {
    /// Per-subscriber queue capacity, in messages. A subscriber whose queue
    /// is full misses further broadcasts until it drains — the loss point of
    /// the fast delivery model.
    pub subscriber_queue_capacity: usize,
}

impl Default for MemTransportConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: 1024,
        }
    }
}

impl MemTransport {
    /// Create a hub with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemTransportConfig::default())
    }

    /// Create a hub with explicit configuration.
    pub fn with_config(config: MemTransportConfig) -> Self {
        Self {
            hub: Arc::new(Hub {
                config,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn broadcast_slot(&self, address: &str) -> Result<Arc<BroadcastSlot>> {
        let mut slots = lock(&self.hub.slots);
        match slots
            .entry(address.to_string())
            .or_insert_with(|| Slot::Broadcast(Arc::new(BroadcastSlot::default())))
        {
            Slot::Broadcast(slot) => Ok(Arc::clone(slot)),
            Slot::Addressed(_) => Err(TransportError::PatternMismatch {
                address: address.to_string(),
            }),
        }
    }

    fn addressed_slot(&self, address: &str) -> Result<Arc<AddressedSlot>> {
        let mut slots = lock(&self.hub.slots);
        match slots
            .entry(address.to_string())
            .or_insert_with(|| Slot::Addressed(Arc::new(AddressedSlot::default())))
        {
            Slot::Addressed(slot) => Ok(Arc::clone(slot)),
            Slot::Broadcast(_) => Err(TransportError::PatternMismatch {
                address: address.to_string(),
            }),
        }
    }
}

impl Transport for MemTransport {
    type Publisher = MemPublisher;
    type Subscriber = MemSubscriber;
    type Responder = MemResponder;
    type Requester = MemRequester;

    fn bind_publisher(&self, address: &str) -> Result<MemPublisher> {
        let slot = self.broadcast_slot(address)?;
        if slot.bound.swap(true, Ordering::AcqRel) {
            return Err(TransportError::AddressInUse {
                address: address.to_string(),
            });
        }
        info!(address, "publisher bound");
        Ok(MemPublisher { slot })
    }

    fn connect_subscriber(&self, address: &str) -> Result<MemSubscriber> {
        let slot = self.broadcast_slot(address)?;
        let queue = Arc::new(MsgQueue::bounded(self.hub.config.subscriber_queue_capacity));
        lock(&slot.subscribers).push(Arc::clone(&queue));
        debug!(address, "subscriber connected");
        Ok(MemSubscriber { queue })
    }

    fn bind_responder(&self, address: &str) -> Result<MemResponder> {
        let slot = self.addressed_slot(address)?;
        if slot.bound.swap(true, Ordering::AcqRel) {
            return Err(TransportError::AddressInUse {
                address: address.to_string(),
            });
        }
        info!(address, "responder bound");
        Ok(MemResponder { slot })
    }

    fn connect_requester(&self, address: &str) -> Result<MemRequester> {
        let slot = self.addressed_slot(address)?;
        let id = EndpointId::from_raw(slot.next_peer.fetch_add(1, Ordering::Relaxed));
        let reply = Arc::new(MsgQueue::unbounded());
        lock(&slot.replies).insert(id, Arc::clone(&reply));
        debug!(address, peer = %id, "requester connected");
        Ok(MemRequester { slot, id, reply })
    }
}

struct Hub {
    config: MemTransportConfig,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Default for Hub {
    fn default() -> Self {
        Self {
            config: MemTransportConfig::default(),
            slots: Mutex::new(HashMap::new()),
        }
    }
}

enum Slot {
    Broadcast(Arc<BroadcastSlot>),
    Addressed(Arc<AddressedSlot>),
}

#[derive(Default)]
struct BroadcastSlot {
    bound: AtomicBool,
    subscribers: Mutex<Vec<Arc<MsgQueue<Multipart>>>>,
}

struct AddressedSlot {
    bound: AtomicBool,
    next_peer: AtomicU64,
    inbound: MsgQueue<(EndpointId, Multipart)>,
    replies: Mutex<HashMap<EndpointId, Arc<MsgQueue<Multipart>>>>,
}

impl Default for AddressedSlot {
    fn default() -> Self {
        Self {
            bound: AtomicBool::new(false),
            next_peer: AtomicU64::new(1),
            inbound: MsgQueue::unbounded(),
            replies: Mutex::new(HashMap::new()),
        }
    }
}

/// Broadcast publisher handle.
pub struct MemPublisher {
    slot: Arc<BroadcastSlot>,
}

impl PublishSocket for MemPublisher {
    fn send(&mut self, message: Multipart) -> Result<()> {
        let mut subscribers = lock(&self.slot.subscribers);
        subscribers.retain(|queue| !queue.is_closed());
        for queue in subscribers.iter() {
            // a full queue drops the message for that subscriber only
            let _ = queue.push(message.clone());
        }
        Ok(())
    }
}

impl Drop for MemPublisher {
    fn drop(&mut self) {
        self.slot.bound.store(false, Ordering::Release);
    }
}

/// Broadcast subscriber handle.
pub struct MemSubscriber {
    queue: Arc<MsgQueue<Multipart>>,
}

impl SubscribeSocket for MemSubscriber {
    fn poll(&mut self, timeout: Timeout) -> Result<bool> {
        Ok(self.queue.wait_nonempty(timeout))
    }

    fn recv(&mut self) -> Result<Multipart> {
        self.queue.pop().ok_or(TransportError::Empty)
    }
}

impl Drop for MemSubscriber {
    fn drop(&mut self) {
        self.queue.close();
    }
}

/// Addressed responder handle.
pub struct MemResponder {
    slot: Arc<AddressedSlot>,
}

impl RespondSocket for MemResponder {
    fn poll(&mut self, timeout: Timeout) -> Result<bool> {
        Ok(self.slot.inbound.wait_nonempty(timeout))
    }

    fn recv(&mut self) -> Result<(EndpointId, Multipart)> {
        self.slot.inbound.pop().ok_or(TransportError::Empty)
    }

    fn send_to(&mut self, peer: &EndpointId, message: Multipart) -> Result<()> {
        if let Some(queue) = lock(&self.slot.replies).get(peer) {
            let _ = queue.push(message);
        }
        Ok(())
    }
}

impl Drop for MemResponder {
    fn drop(&mut self) {
        self.slot.bound.store(false, Ordering::Release);
    }
}

/// Addressed requester handle.
pub struct MemRequester {
    slot: Arc<AddressedSlot>,
    id: EndpointId,
    reply: Arc<MsgQueue<Multipart>>,
}

impl RequestSocket for MemRequester {
    fn send(&mut self, message: Multipart) -> Result<()> {
        let _ = self.slot.inbound.push((self.id, message));
        Ok(())
    }

    fn poll(&mut self, timeout: Timeout) -> Result<bool> {
        Ok(self.reply.wait_nonempty(timeout))
    }

    fn recv(&mut self) -> Result<Multipart> {
        self.reply.pop().ok_or(TransportError::Empty)
    }
}

impl Drop for MemRequester {
    fn drop(&mut self) {
        lock(&self.slot.replies).remove(&self.id);
        self.reply.close();
    }
}

struct MsgQueue<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
    closed: AtomicBool,
}

impl<T> MsgQueue<T> {
    fn bounded(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn unbounded() -> Self {
        Self::bounded(usize::MAX)
    }

    fn push(&self, item: T) -> bool {
        let mut items = lock(&self.items);
        if items.len() >= self.capacity {
            return false;
        }
        items.push_back(item);
        drop(items);
        self.ready.notify_one();
        true
    }

    fn pop(&self) -> Option<T> {
        lock(&self.items).pop_front()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn wait_nonempty(&self, timeout: Timeout) -> bool {
        let deadline = Deadline::start(timeout);
        let mut items = lock(&self.items);
        loop {
            if !items.is_empty() {
                return true;
            }
            match deadline.remaining() {
                Timeout::Immediate => return false,
                Timeout::Forever => {
                    items = self
                        .ready
                        .wait(items)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Timeout::Bounded(wait) => {
                    let (guard, _) = self
                        .ready
                        .wait_timeout(items, wait)
                        .unwrap_or_else(PoisonError::into_inner);
                    items = guard;
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;

    fn msg(text: &str) -> Multipart {
        vec![Bytes::copy_from_slice(text.as_bytes())]
    }

    #[test]
    fn publish_without_subscribers_succeeds() {
        let transport = MemTransport::new();
        let mut publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        publisher.send(msg("nobody home")).unwrap();
    }

    #[test]
    fn broadcast_fans_out_to_all_subscribers() {
        let transport = MemTransport::new();
        let mut publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        let mut first = transport.connect_subscriber("tcp://127.0.0.1:5562").unwrap();
        let mut second = transport.connect_subscriber("tcp://127.0.0.1:5562").unwrap();

        publisher.send(msg("hello")).unwrap();

        for subscriber in [&mut first, &mut second] {
            assert!(subscriber.poll(Timeout::Immediate).unwrap());
            assert_eq!(subscriber.recv().unwrap(), msg("hello"));
        }
    }

    #[test]
    fn late_subscriber_misses_earlier_messages() {
        let transport = MemTransport::new();
        let mut publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        publisher.send(msg("early")).unwrap();

        let mut late = transport.connect_subscriber("tcp://127.0.0.1:5562").unwrap();
        assert!(!late.poll(Timeout::Immediate).unwrap());
    }

    #[test]
    fn full_subscriber_queue_drops_messages() {
        let transport = MemTransport::with_config(MemTransportConfig {
            subscriber_queue_capacity: 2,
        });
        let mut publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        let mut subscriber = transport.connect_subscriber("tcp://127.0.0.1:5562").unwrap();

        for i in 0..5 {
            publisher.send(msg(&format!("m{i}"))).unwrap();
        }

        assert_eq!(subscriber.recv().unwrap(), msg("m0"));
        assert_eq!(subscriber.recv().unwrap(), msg("m1"));
        assert!(!subscriber.poll(Timeout::Immediate).unwrap());
    }

    #[test]
    fn addressed_request_reply_roundtrip() {
        let transport = MemTransport::new();
        let mut responder = transport.bind_responder("tcp://127.0.0.1:6000").unwrap();
        let mut requester = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();

        requester.send(msg("ping")).unwrap();
        assert!(responder.poll(Timeout::Immediate).unwrap());
        let (peer, inbound) = responder.recv().unwrap();
        assert_eq!(inbound, msg("ping"));

        responder.send_to(&peer, msg("pong")).unwrap();
        assert!(requester.poll(Timeout::Immediate).unwrap());
        assert_eq!(requester.recv().unwrap(), msg("pong"));
    }

    #[test]
    fn requesters_get_distinct_identities() {
        let transport = MemTransport::new();
        let mut responder = transport.bind_responder("tcp://127.0.0.1:6000").unwrap();
        let mut first = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();
        let mut second = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();

        first.send(msg("a")).unwrap();
        second.send(msg("b")).unwrap();

        let (peer_a, _) = responder.recv().unwrap();
        let (peer_b, _) = responder.recv().unwrap();
        assert_ne!(peer_a, peer_b);

        responder.send_to(&peer_b, msg("for b")).unwrap();
        assert!(!first.poll(Timeout::Immediate).unwrap());
        assert_eq!(second.recv().unwrap(), msg("for b"));
    }

    #[test]
    fn connect_before_bind_queues_messages() {
        let transport = MemTransport::new();
        let mut requester = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();
        requester.send(msg("queued")).unwrap();

        let mut responder = transport.bind_responder("tcp://127.0.0.1:6000").unwrap();
        assert!(responder.poll(Timeout::Immediate).unwrap());
        let (_, inbound) = responder.recv().unwrap();
        assert_eq!(inbound, msg("queued"));
    }

    #[test]
    fn reply_to_dropped_requester_is_silently_skipped() {
        let transport = MemTransport::new();
        let mut responder = transport.bind_responder("tcp://127.0.0.1:6000").unwrap();
        let mut requester = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();
        requester.send(msg("x")).unwrap();
        let (peer, _) = responder.recv().unwrap();

        drop(requester);
        responder.send_to(&peer, msg("too late")).unwrap();
    }

    #[test]
    fn double_bind_rejected_and_rebind_after_drop_allowed() {
        let transport = MemTransport::new();
        let publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        assert!(matches!(
            transport.bind_publisher("tcp://127.0.0.1:5562"),
            Err(TransportError::AddressInUse { .. })
        ));

        drop(publisher);
        transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
    }

    #[test]
    fn pattern_mismatch_rejected() {
        let transport = MemTransport::new();
        let _publisher = transport.bind_publisher("tcp://127.0.0.1:5562").unwrap();
        assert!(matches!(
            transport.bind_responder("tcp://127.0.0.1:5562"),
            Err(TransportError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn bounded_poll_times_out_without_data() {
        let transport = MemTransport::new();
        let mut subscriber = transport.connect_subscriber("tcp://127.0.0.1:5562").unwrap();
        let start = std::time::Instant::now();
        assert!(!subscriber.poll(Timeout::from_millis(30)).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn blocking_poll_wakes_on_cross_thread_send() {
        let transport = MemTransport::new();
        let mut responder = transport.bind_responder("tcp://127.0.0.1:6000").unwrap();

        let sender = {
            let transport = transport.clone();
            thread::spawn(move || {
                let mut requester = transport.connect_requester("tcp://127.0.0.1:6000").unwrap();
                thread::sleep(Duration::from_millis(20));
                requester.send(msg("wake up")).unwrap();
                // keep the requester alive until the message is consumed
                thread::sleep(Duration::from_millis(50));
            })
        };

        assert!(responder.poll(Timeout::Forever).unwrap());
        let (_, inbound) = responder.recv().unwrap();
        assert_eq!(inbound, msg("wake up"));
        sender.join().unwrap();
    }
}

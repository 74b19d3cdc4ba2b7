use crate::core::bus::message::BusMessage;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

struct Subscriber {
    handle: SubscriptionHandle,
    sender: mpsc::UnboundedSender<BusMessage>,
}

struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// In-process publish/subscribe hub. Process-wide lifetime: created once at
/// startup and shared via `Arc`.
///
/// Delivery is at-most-once per subscriber per publish, in registration
/// order, over non-blocking channel sends. A subscriber whose receiver has
/// been dropped never prevents delivery to later subscribers; it is logged
/// and pruned after the delivery pass.
pub struct MessageBus {
    inner: Mutex<BusInner>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BusInner {
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Register a new subscriber. Messages published before this call are
    /// never replayed.
    pub fn subscribe(&self) -> (SubscriptionHandle, mpsc::UnboundedReceiver<BusMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().expect("bus lock poisoned");
        let handle = SubscriptionHandle(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push(Subscriber { handle, sender });
        debug!("Bus subscriber {:?} registered", handle);
        (handle, receiver)
    }

    /// Remove a subscription. Unknown handles are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.inner.lock().expect("bus lock poisoned");
        inner.subscribers.retain(|s| s.handle != handle);
        debug!("Bus subscriber {:?} removed", handle);
    }

    /// Fan a message out to every current subscriber in registration order.
    pub fn publish(&self, message: BusMessage) {
        let mut inner = self.inner.lock().expect("bus lock poisoned");
        let mut dead: Vec<SubscriptionHandle> = Vec::new();
        for subscriber in &inner.subscribers {
            if subscriber.sender.send(message.clone()).is_err() {
                warn!(
                    "Bus delivery to {:?} failed (receiver dropped), skipping",
                    subscriber.handle
                );
                dead.push(subscriber.handle);
            }
        }
        if !dead.is_empty() {
            inner.subscribers.retain(|s| !dead.contains(&s.handle));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().expect("bus lock poisoned").subscribers.len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bus::message::Record;

    #[tokio::test]
    async fn test_delivery_in_registration_order() {
        let bus = MessageBus::new();
        let (_h1, mut rx1) = bus.subscribe();
        let (_h2, mut rx2) = bus.subscribe();

        bus.publish(BusMessage::Data(Record::new("first")));

        // Unbounded sends complete during publish, so both are ready now.
        assert_eq!(rx1.try_recv().unwrap(), BusMessage::Data(Record::new("first")));
        assert_eq!(rx2.try_recv().unwrap(), BusMessage::Data(Record::new("first")));
    }

    #[tokio::test]
    async fn test_dead_subscriber_does_not_block_later_ones() {
        let bus = MessageBus::new();
        let (_h1, rx1) = bus.subscribe();
        let (_h2, mut rx2) = bus.subscribe();

        drop(rx1);
        bus.publish(BusMessage::DeviceSelected(true));

        assert_eq!(rx2.try_recv().unwrap(), BusMessage::DeviceSelected(true));
        // The dead subscriber was pruned during the publish pass.
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = MessageBus::new();
        let (h1, mut rx1) = bus.subscribe();

        bus.unsubscribe(h1);
        bus.publish(BusMessage::DeviceSelected(false));

        assert!(rx1.try_recv().is_err());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let bus = MessageBus::new();
        bus.publish(BusMessage::Data(Record::new("early")));

        let (_h, mut rx) = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }
}

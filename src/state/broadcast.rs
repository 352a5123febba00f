//! Push-based broadcast to channel subscribers.
//!
//! Each subscriber owns an `mpsc::Receiver`; teardown is explicit through
//! [`Broadcaster::unsubscribe`]. Subscribers whose receiver was dropped are
//! pruned on the next publish instead of failing it.

use std::sync::mpsc::{self, Receiver, Sender};
use tracing::trace;

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer list delivering clones of each published value.
#[derive(Debug)]
pub struct Broadcaster<T> {
    subscribers: Vec<(SubscriptionId, Sender<T>)>,
    next_id: u64,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Broadcaster<T> {
    /// Broadcaster with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> (SubscriptionId, Receiver<T>) {
        let (tx, rx) = mpsc::channel();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, tx));
        (id, rx)
    }

    /// Remove a subscriber. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Send `value` to every live subscriber.
    pub fn publish(&mut self, value: &T) {
        self.subscribers.retain(|(id, tx)| {
            let delivered = tx.send(value.clone()).is_ok();
            if !delivered {
                trace!(subscription = id.0, "Pruning subscriber with dropped receiver");
            }
            delivered
        });
    }

    /// Live subscribers, as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

//! Broadcast bus linking all open views and the background worker.
//!
//! In-process fan-out over a tokio broadcast channel. Delivery is
//! best-effort and at-most-once per subscriber: a lagged receiver skips
//! what it missed, and a subscriber created after a publish never sees
//! that message. A publisher never receives its own messages, so the
//! origin view must update its own render synchronously after an append
//! rather than waiting on the bus.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use super::model::IncidentRecord;

const BUS_CAPACITY: usize = 64;

/// Message carried on the bus.
#[derive(Debug, Clone)]
pub enum BusMessage {
    /// A new incident was appended to the store.
    Alert(IncidentRecord),
    /// The store was cleared; subscribers should re-read and re-render.
    Reset,
}

#[derive(Debug, Clone)]
struct Envelope {
    origin: u64,
    message: BusMessage,
}

/// The shared channel. Construct once per process group and hand out one
/// [`BusHandle`] per participating context.
pub struct AlertBus {
    sender: broadcast::Sender<Envelope>,
    next_origin: AtomicU64,
}

impl AlertBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            sender,
            next_origin: AtomicU64::new(1),
        }
    }

    /// Take a handle with a fresh origin id.
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            origin: self.next_origin.fetch_add(1, Ordering::Relaxed),
            sender: self.sender.clone(),
        }
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One context's connection to the bus. Publishing and subscribing through
/// the same handle share an origin id, which is what suppresses
/// self-delivery.
#[derive(Clone)]
pub struct BusHandle {
    origin: u64,
    sender: broadcast::Sender<Envelope>,
}

impl BusHandle {
    /// Publish to every other subscribed context. Silently drops if nobody
    /// is listening (fire-and-forget).
    pub fn publish(&self, message: BusMessage) {
        let _ = self.sender.send(Envelope {
            origin: self.origin,
            message,
        });
    }

    /// Subscribe from this point forward; no backlog is replayed.
    pub fn subscribe(&self) -> BusSubscription {
        BusSubscription {
            origin: self.origin,
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving end of a [`BusHandle`].
pub struct BusSubscription {
    origin: u64,
    receiver: broadcast::Receiver<Envelope>,
}

impl BusSubscription {
    /// Wait for the next message from another context. Returns `None` once
    /// the bus is gone. Lagged messages are skipped, not retried.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.origin == self.origin => continue,
                Ok(envelope) => return Some(envelope.message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("bus subscriber lagged, skipped {} messages", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

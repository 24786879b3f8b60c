//! # Event Bus Broker
//!
//! Defines the publishing side of the bus and the broker task that owns
//! the subscriber set.
//!
//! All mutation of the subscriber set happens inside one broker task;
//! registration and publication are command sends on its channel. Nothing
//! ever holds a lock across a delivery, and `publish` never waits on a
//! subscriber.

use crate::events::CallEvent;
use crate::subscriber::Subscription;
use crate::DEFAULT_SUBSCRIBER_CAPACITY;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Errors from bus operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The broker has stopped; no further events will be delivered.
    #[error("event bus closed")]
    Closed,
}

/// Commands processed by the broker task.
enum BusCommand {
    /// Register a new subscriber and hand its receiving half back.
    Subscribe {
        reply: oneshot::Sender<Subscription>,
    },
    /// Fan an event out to every registered subscriber.
    Publish(CallEvent),
    /// Stop the broker and drop all subscriber channels.
    Shutdown,
}

/// Shared counters, updated by the broker, read through the handle.
#[derive(Debug, Default)]
struct BusCounters {
    published: AtomicU64,
    dropped: AtomicU64,
    subscribers: AtomicUsize,
}

/// A registered subscriber as the broker sees it.
struct SubscriberSlot {
    id: u64,
    sender: mpsc::Sender<CallEvent>,
}

/// Handle to the in-memory event bus.
///
/// Cheap to share behind an `Arc`. `publish` is a non-blocking enqueue on
/// the broker's command channel, so a slow or stuck subscriber can never
/// stall a publisher. Events are delivered to each subscriber in publish
/// order; a subscriber whose private queue overflows loses the newest
/// event (for itself only), and one whose receiving half was dropped is
/// removed at the next delivery attempt.
pub struct EventBus {
    commands: mpsc::UnboundedSender<BusCommand>,
    counters: Arc<BusCounters>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus with the default per-subscriber queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Create a bus whose subscribers each buffer up to `capacity` events.
    ///
    /// Spawns the broker task; must be called from within a tokio runtime.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let counters = Arc::new(BusCounters::default());

        tokio::spawn(run_broker(command_rx, capacity, Arc::clone(&counters)));

        Self {
            commands,
            counters,
            capacity,
        }
    }

    /// Register a new subscriber.
    ///
    /// The subscription only observes events published after registration
    /// completes; there is no backfill.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Closed`] if the broker has stopped.
    pub async fn subscribe(&self) -> Result<Subscription, BusError> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(BusCommand::Subscribe { reply })
            .map_err(|_| BusError::Closed)?;
        reply_rx.await.map_err(|_| BusError::Closed)
    }

    /// Publish an event to all current subscribers.
    ///
    /// Fire-and-forget: enqueues the event on the broker's command channel
    /// and returns immediately. Never waits on any subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Closed`] once the broker has stopped. A publish
    /// racing shutdown may be accepted and then silently discarded.
    pub fn publish(&self, event: CallEvent) -> Result<(), BusError> {
        self.commands
            .send(BusCommand::Publish(event))
            .map_err(|_| BusError::Closed)
    }

    /// Stop the broker and close every subscriber channel.
    ///
    /// Idempotent. Subscribers observe the shutdown as end-of-stream on
    /// their next receive.
    pub fn shutdown(&self) {
        let _ = self.commands.send(BusCommand::Shutdown);
    }

    /// Total events accepted for delivery.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.counters.published.load(Ordering::Relaxed)
    }

    /// Total per-subscriber deliveries dropped to full queues.
    #[must_use]
    pub fn events_dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Current registered subscriber count.
    ///
    /// Dead subscribers are reaped lazily, so this may briefly overcount
    /// until the next delivery attempt.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.counters.subscribers.load(Ordering::Relaxed)
    }

    /// Per-subscriber queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Broker loop: sole owner of the subscriber set.
///
/// Commands arrive in send order, so every subscriber registered before a
/// publish observes events in exactly the order they were published.
async fn run_broker(
    mut commands: mpsc::UnboundedReceiver<BusCommand>,
    capacity: usize,
    counters: Arc<BusCounters>,
) {
    let mut subscribers: Vec<SubscriberSlot> = Vec::new();
    let mut next_id: u64 = 0;

    while let Some(command) = commands.recv().await {
        match command {
            BusCommand::Subscribe { reply } => {
                next_id += 1;
                let id = next_id;
                let (sender, receiver) = mpsc::channel(capacity);
                if reply.send(Subscription::new(id, receiver)).is_ok() {
                    subscribers.push(SubscriberSlot { id, sender });
                    debug!(subscriber = id, "subscription registered");
                }
                // Requester gone before the reply: nothing was registered.
                counters
                    .subscribers
                    .store(subscribers.len(), Ordering::Relaxed);
            }
            BusCommand::Publish(event) => {
                counters.published.fetch_add(1, Ordering::Relaxed);
                subscribers.retain(|slot| match slot.sender.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        counters.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(subscriber = slot.id, "queue full, event dropped");
                        true
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(subscriber = slot.id, "subscriber gone, removed");
                        false
                    }
                });
                counters
                    .subscribers
                    .store(subscribers.len(), Ordering::Relaxed);
            }
            BusCommand::Shutdown => break,
        }
    }

    // Dropping the senders ends every subscriber stream.
    subscribers.clear();
    counters.subscribers.store(0, Ordering::Relaxed);
    debug!("event bus broker stopped");
}

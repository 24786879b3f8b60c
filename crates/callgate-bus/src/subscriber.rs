//! # Event Subscriber
//!
//! Defines the subscription side of the bus.

use crate::broker::BusError;
use crate::events::CallEvent;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// A subscription handle for receiving events.
///
/// The broker holds the sending half of this channel. Dropping the
/// subscription closes the receiving half, which the broker notices at
/// its next delivery attempt and removes the subscriber.
pub struct Subscription {
    /// Broker-assigned id, used in delivery logs.
    id: u64,

    /// Receiving half of this subscriber's private bounded queue.
    receiver: mpsc::Receiver<CallEvent>,
}

impl Subscription {
    pub(crate) fn new(id: u64, receiver: mpsc::Receiver<CallEvent>) -> Self {
        Self { id, receiver }
    }

    /// Broker-assigned subscriber id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event, in publish order
    /// - `None` - The bus shut down; no further events will arrive
    pub async fn recv(&mut self) -> Option<CallEvent> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was queued
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(BusError::Closed)` - The bus shut down
    pub fn try_recv(&mut self) -> Result<Option<CallEvent>, BusError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(BusError::Closed),
        }
    }

    /// Convert into a `Stream` of events for use with stream combinators.
    ///
    /// The stream ends when the bus shuts down.
    #[must_use]
    pub fn into_stream(self) -> ReceiverStream<CallEvent> {
        ReceiverStream::new(self.receiver)
    }
}

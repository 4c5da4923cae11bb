/**
 * Broadcast Router
 *
 * A single consumer task that receives every real-time event and fans each
 * one out to all sessions sharing its couple scope.
 *
 * # Pipeline
 *
 * Events flow through one unbounded `mpsc` queue. `EventPublisher::publish`
 * never blocks a connection's read loop; memory is the only bound. Events
 * are consumed strictly in arrival order (one global FIFO, no per-scope
 * reordering) and every session in scope receives the event, including the
 * one that produced it.
 *
 * # Delivery Failures
 *
 * Delivery only enqueues onto the session's bounded outbound queue, so the
 * router never waits on a socket. When a queue is full the router waits up
 * to the delivery timeout for the session's writer to make room; a reader
 * that is only behind slows the fan-out instead of being dropped. A closed
 * queue, or one that stays full for the whole timeout, is a failure local to
 * that session: it is deregistered, a `user_left` event is re-published
 * through the pipeline, and the fan-out continues with the next session.
 *
 * # Shutdown
 *
 * The router holds only a weak sender to its own queue, so the loop ends
 * once every `EventPublisher` has been dropped and the queue is drained.
 */
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::config::DEFAULT_DELIVERY_TIMEOUT;
use crate::shared::Event;

/// Cloneable entry point into the router pipeline
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventPublisher {
    /// Enqueue an event for fan-out
    ///
    /// Fails only if the router has stopped.
    pub fn publish(&self, event: Event) -> Result<(), RealtimeError> {
        self.tx.send(event).map_err(|_| RealtimeError::PipelineClosed)
    }

    /// Whether the router is still consuming
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single-consumer fan-out actor
pub struct BroadcastRouter {
    registry: ConnectionRegistry,
    rx: mpsc::UnboundedReceiver<Event>,
    requeue: mpsc::WeakUnboundedSender<Event>,
    delivery_timeout: Duration,
}

impl BroadcastRouter {
    /// Create a router and the publisher feeding it
    pub fn new(registry: ConnectionRegistry) -> (Self, EventPublisher) {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = Self {
            registry,
            rx,
            requeue: tx.downgrade(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        };
        (router, EventPublisher { tx })
    }

    /// Override how long a fan-out waits on one full queue
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Create a router and run it on its own task
    pub fn spawn(
        registry: ConnectionRegistry,
        delivery_timeout: Duration,
    ) -> (EventPublisher, JoinHandle<()>) {
        let (router, publisher) = Self::new(registry);
        let router = router.with_delivery_timeout(delivery_timeout);
        (publisher, tokio::spawn(router.run()))
    }

    /// Consume events until every publisher is gone
    pub async fn run(mut self) {
        tracing::info!("[Router] Started");
        while let Some(event) = self.rx.recv().await {
            self.dispatch(event).await;
        }
        tracing::info!("[Router] Pipeline closed, stopping");
    }

    /// Fan one event out to its scope
    ///
    /// Returns the number of sessions the event was delivered to.
    pub async fn dispatch(&self, event: Event) -> usize {
        let mut pending = VecDeque::from([event]);
        let mut delivered = 0;

        while let Some(event) = pending.pop_front() {
            let event = Arc::new(event);
            let sessions = self.registry.sessions_in_scope(event.couple_id());
            tracing::debug!(
                "[Router] {:?} from {} to {} session(s) in {}",
                event.kind(),
                event.sender(),
                sessions.len(),
                event.couple_id()
            );

            for session in sessions {
                match session.deliver(Arc::clone(&event), self.delivery_timeout).await {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        tracing::warn!("[Router] {}", err);
                        let Some(gone) = self.registry.deregister(session.id()) else {
                            continue;
                        };
                        tracing::info!(
                            "[Router] Dropped {} from couple {} after failed delivery",
                            gone.username(),
                            gone.couple_id()
                        );
                        let left = Event::left(gone.username(), gone.couple_id());
                        if let Some(left) = self.republish(left) {
                            pending.push_back(left);
                        }
                    }
                }
            }
        }

        delivered
    }

    /// Take the next queued event without waiting
    #[cfg(test)]
    pub(crate) fn try_next(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Re-enter the pipeline; hands the event back if the pipeline is closing
    fn republish(&self, event: Event) -> Option<Event> {
        match self.requeue.upgrade() {
            Some(tx) => tx.send(event).err().map(|err| err.0),
            None => Some(event),
        }
    }
}

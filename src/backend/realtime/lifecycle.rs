/**
 * Session Lifecycle
 *
 * Orchestrates registration, presence events and cleanup around each
 * connection's read loop.
 *
 * # States
 *
 * ```text
 * Connecting --(non-empty username and couple_id)--> Active --(read error,
 *     parse error, close, failed delivery)--> Closed
 * Connecting --(anything else)--> Closed   (no events)
 * ```
 *
 * A session that reaches `Active` produces exactly one `user_joined` and
 * exactly one `user_left`. The registry decides who emits `user_left`: only
 * the caller whose `deregister` actually removed the session publishes it,
 * whether that is `on_disconnect` or the router after a failed delivery.
 */
use crate::backend::realtime::broadcast::EventPublisher;
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, Session};
use crate::shared::{Event, InboundFrame};

/// Drives sessions through `Connecting -> Active -> Closed`
#[derive(Debug, Clone)]
pub struct SessionManager {
    registry: ConnectionRegistry,
    publisher: EventPublisher,
}

impl SessionManager {
    pub fn new(registry: ConnectionRegistry, publisher: EventPublisher) -> Self {
        Self { registry, publisher }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Register a new connection and announce it
    ///
    /// Empty `username` or `couple_id` rejects the connection before it is
    /// registered; no event is published in that case.
    pub fn on_connect(
        &self,
        handle: ConnectionHandle,
        username: &str,
        couple_id: &str,
    ) -> Result<Session, RealtimeError> {
        if username.is_empty() {
            tracing::warn!("[Realtime] Rejected connection {}: missing username", handle.id());
            return Err(RealtimeError::rejected("missing username"));
        }
        if couple_id.is_empty() {
            tracing::warn!("[Realtime] Rejected connection {}: missing couple_id", handle.id());
            return Err(RealtimeError::rejected("missing couple_id"));
        }

        let session = self.registry.register(handle, username, couple_id).map_err(|err| {
            tracing::error!("[Realtime] {}", err);
            err
        })?;

        if let Err(err) = self.publisher.publish(Event::joined(username, couple_id)) {
            self.registry.deregister(session.id());
            return Err(err);
        }

        tracing::info!("[Realtime] User {} joined couple {}", username, couple_id);
        Ok(session)
    }

    /// Stamp and publish one inbound payload
    ///
    /// A parse failure is returned to the caller, which must terminate the
    /// connection; nothing is published for it.
    pub fn on_inbound_payload(&self, id: ConnectionId, raw: &[u8]) -> Result<(), RealtimeError> {
        let session = self.registry.get(id).ok_or(RealtimeError::SessionClosed(id))?;

        let frame = InboundFrame::parse(raw).map_err(|err| {
            tracing::warn!(
                "[Realtime] Malformed payload from {} on {}: {}",
                session.username(),
                id,
                err
            );
            RealtimeError::MalformedPayload(err)
        })?;

        let event = Event::from_inbound(frame, session.username(), session.couple_id());
        self.publisher.publish(event)
    }

    /// Tear down a session
    ///
    /// Safe to call any number of times; returns true only for the call
    /// that removed the session and published its `user_left` event.
    pub fn on_disconnect(&self, id: ConnectionId) -> bool {
        let Some(session) = self.registry.deregister(id) else {
            return false;
        };

        tracing::info!(
            "[Realtime] User {} left couple {}",
            session.username(),
            session.couple_id()
        );
        if let Err(err) = self
            .publisher
            .publish(Event::left(session.username(), session.couple_id()))
        {
            tracing::warn!("[Realtime] Could not announce departure of {}: {}", session.username(), err);
        }
        true
    }
}

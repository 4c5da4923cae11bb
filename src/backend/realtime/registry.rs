/**
 * Connection Registry
 *
 * The set of currently-open real-time connections and the session metadata
 * attached to each.
 *
 * # Concurrency
 *
 * Every connection task registers and deregisters concurrently while the
 * router queries by couple scope. All access goes through a single
 * `RwLock`: inserts and removals take the write lock, lookups take the read
 * lock and return owned snapshots. A snapshot may include a session that is
 * removed a moment later; delivering to it fails cleanly because its
 * outbound queue is closed.
 *
 * # Handles
 *
 * A `ConnectionHandle` is the outbound half of a connection: an id plus the
 * sender side of the connection's outbound queue. It is not `Clone`; the
 * lifecycle manager creates it and moves it into the registry, so the only
 * outbound senders alive are the registry's own (and transient router
 * snapshots).
 */
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use uuid::Uuid;

use crate::backend::realtime::error::RealtimeError;
use crate::shared::Event;

/// Opaque connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound half of one real-time connection
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Arc<Event>>,
}

impl ConnectionHandle {
    /// Wrap an existing outbound queue
    pub fn new(id: ConnectionId, outbound: mpsc::Sender<Arc<Event>>) -> Self {
        Self { id, outbound }
    }

    /// Fresh handle plus the receiving end its writer task drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<Event>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(ConnectionId::new(), tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Server-side record of one open connection
///
/// `username` and `couple_id` are fixed at registration.
#[derive(Debug, Clone)]
pub struct Session {
    id: ConnectionId,
    username: Arc<str>,
    couple_id: Arc<str>,
    outbound: mpsc::Sender<Arc<Event>>,
}

impl Session {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn couple_id(&self) -> &str {
        &self.couple_id
    }

    /// Queue an event for this session's writer
    ///
    /// Waits up to `wait` for room in the queue. A closed queue fails at once;
    /// a queue that stays full for the whole window counts as a stalled peer.
    pub async fn deliver(&self, event: Arc<Event>, wait: Duration) -> Result<(), RealtimeError> {
        self.outbound.send_timeout(event, wait).await.map_err(|err| {
            let reason = match err {
                SendTimeoutError::Timeout(_) => "outbound queue stalled",
                SendTimeoutError::Closed(_) => "connection closed",
            };
            RealtimeError::DeliveryFailure {
                connection: self.id,
                reason,
            }
        })
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    sessions: HashMap<ConnectionId, Session>,
    scopes: HashMap<Arc<str>, HashSet<ConnectionId>>,
}

/// Thread-safe set of open sessions, indexed by couple scope
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under `username` and `couple_id`
    ///
    /// Fails with `DuplicateConnection` if the handle's id is already present.
    pub fn register(
        &self,
        handle: ConnectionHandle,
        username: &str,
        couple_id: &str,
    ) -> Result<Session, RealtimeError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.sessions.contains_key(&handle.id) {
            return Err(RealtimeError::DuplicateConnection(handle.id));
        }

        let session = Session {
            id: handle.id,
            username: Arc::from(username),
            couple_id: Arc::from(couple_id),
            outbound: handle.outbound,
        };
        inner
            .scopes
            .entry(session.couple_id.clone())
            .or_default()
            .insert(session.id);
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    /// Remove a session
    ///
    /// Returns the removed session, or `None` if it was not registered. Only
    /// the caller that receives `Some` owns the follow-up (the `left` event),
    /// which is how concurrent cleanup paths agree on exactly one removal.
    pub fn deregister(&self, id: ConnectionId) -> Option<Session> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let session = inner.sessions.remove(&id)?;
        if let Some(members) = inner.scopes.get_mut(session.couple_id.as_ref()) {
            members.remove(&id);
            if members.is_empty() {
                inner.scopes.remove(session.couple_id.as_ref());
            }
        }
        Some(session)
    }

    /// Snapshot of every session in `couple_id`, unordered
    pub fn sessions_in_scope(&self, couple_id: &str) -> Vec<Session> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .scopes
            .get(couple_id)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|id| inner.sessions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, id: ConnectionId) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .get(&id)
            .cloned()
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of couple scopes with at least one session
    pub fn scope_count(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).scopes.len()
    }
}

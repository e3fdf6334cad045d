//! Individual observer connection
//!
//! Identity, lifecycle state and the bounded outbound queue the hub writes into.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Serialized envelope shared by every queue it is broadcast to
pub type Frame = Arc<str>;

/// Unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgraded, not yet registered with the hub
    Connecting,
    /// Member of the hub's active set
    Registered,
    /// Unregistered, tasks winding down
    Draining,
    /// Transport closed
    Closed,
}

impl ConnectionState {
    /// Whether moving from `self` to `next` is a legal transition
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Registered)
                | (Self::Connecting, Self::Closed)
                | (Self::Registered, Self::Draining)
                | (Self::Draining, Self::Closed)
        )
    }
}

/// A single observer connection as seen by its own tasks
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
}

impl Connection {
    /// Create the hub-side handle and the queue receiver for a new connection
    ///
    /// The queue holds at most `capacity` frames; the hub never blocks on it.
    #[must_use]
    pub fn new(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = ConnectionHandle {
            id: ConnectionId::generate(),
            sender,
        };
        (handle, receiver)
    }

    /// Start tracking the lifecycle of the connection behind `handle`
    #[must_use]
    pub fn track(handle: &ConnectionHandle) -> Self {
        Self {
            id: handle.id,
            state: ConnectionState::Connecting,
        }
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move to `next`, ignoring transitions that would go backwards
    pub fn transition(&mut self, next: ConnectionState) -> bool {
        if self.state.can_transition_to(next) {
            tracing::trace!(connection_id = %self.id, from = ?self.state, to = ?next, "State change");
            self.state = next;
            true
        } else {
            tracing::debug!(
                connection_id = %self.id,
                from = ?self.state,
                to = ?next,
                "Ignoring illegal state transition"
            );
            false
        }
    }
}

/// What the hub stores for each member
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<Frame>,
}

impl ConnectionHandle {
    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame without waiting
    pub fn try_send(&self, frame: Frame) -> Result<(), TrySendError<Frame>> {
        self.sender.try_send(frame)
    }

    /// Check if the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

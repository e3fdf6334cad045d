//! Hub actor
//!
//! The loop owns the registry outright; every membership change and broadcast
//! is a command on one bounded mailbox, so they are applied in submission order.

use std::collections::HashMap;
use std::sync::Arc;

use sms_common::HubConfig;
use sms_core::Envelope;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;

use super::handler::HandlerSlot;
use super::{HubError, MessageHandler};
use crate::connection::{Connection, ConnectionHandle, ConnectionId, Frame};

/// Commands processed by the hub loop
#[derive(Debug)]
pub enum HubCommand {
    Register(ConnectionHandle),
    Unregister(ConnectionId),
    Broadcast(Envelope),
    ActiveCount(oneshot::Sender<usize>),
    Shutdown,
}

/// Registry of active observer connections
#[derive(Debug)]
pub struct Hub {
    commands: mpsc::Receiver<HubCommand>,
    members: HashMap<ConnectionId, ConnectionHandle>,
}

impl Hub {
    /// Create a hub and the handle used to drive it
    ///
    /// Nothing happens until [`Hub::run`] is polled.
    #[must_use]
    pub fn new(config: &HubConfig) -> (HubHandle, Self) {
        let (sender, commands) = mpsc::channel(config.command_buffer.max(1));
        let handle = HubHandle {
            commands: sender,
            handler: HandlerSlot::default(),
            queue_capacity: config.queue_capacity.max(1),
        };
        let hub = Self {
            commands,
            members: HashMap::new(),
        };
        (handle, hub)
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("Hub started");

        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register(conn) => self.register(conn),
                HubCommand::Unregister(id) => self.unregister(id),
                HubCommand::Broadcast(envelope) => self.broadcast(&envelope),
                HubCommand::ActiveCount(reply) => {
                    let _ = reply.send(self.members.len());
                }
                HubCommand::Shutdown => break,
            }
        }

        let closed = self.members.len();
        // Dropping the senders closes every queue; writers then send Close
        self.members.clear();
        tracing::info!(closed, "Hub stopped");
    }

    fn register(&mut self, conn: ConnectionHandle) {
        let id = conn.id();
        if self.members.insert(id, conn).is_some() {
            tracing::warn!(connection_id = %id, "Connection registered twice, queue replaced");
        } else {
            tracing::debug!(connection_id = %id, active = self.members.len(), "Connection registered");
        }
    }

    fn unregister(&mut self, id: ConnectionId) {
        if self.members.remove(&id).is_some() {
            tracing::debug!(connection_id = %id, active = self.members.len(), "Connection unregistered");
        }
    }

    fn broadcast(&mut self, envelope: &Envelope) {
        let frame: Frame = match envelope.to_json() {
            Ok(json) => Frame::from(json),
            Err(e) => {
                tracing::error!(kind = %envelope.kind(), error = %e, "Failed to encode envelope");
                return;
            }
        };

        let before = self.members.len();
        self.members.retain(|id, conn| match conn.try_send(frame.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(connection_id = %id, "Outbound queue full, dropping connection");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %id, "Outbound queue closed, dropping connection");
                false
            }
        });

        tracing::debug!(
            kind = %envelope.kind(),
            delivered = self.members.len(),
            dropped = before - self.members.len(),
            "Broadcast"
        );
    }
}

/// Cloneable handle for submitting commands to the hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    handler: HandlerSlot,
    queue_capacity: usize,
}

impl HubHandle {
    /// Create a hub and run it on the current runtime
    #[must_use]
    pub fn spawn(config: &HubConfig) -> Self {
        let (handle, hub) = Hub::new(config);
        tokio::spawn(hub.run());
        handle
    }

    /// Create a connection whose queue has the configured capacity
    #[must_use]
    pub fn new_connection(&self) -> (ConnectionHandle, mpsc::Receiver<Frame>) {
        Connection::new(self.queue_capacity)
    }

    /// Add a connection to the active set
    pub async fn register(&self, conn: ConnectionHandle) -> Result<(), HubError> {
        self.send(HubCommand::Register(conn)).await
    }

    /// Remove a connection and close its queue; unknown ids are ignored
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(id)).await
    }

    /// Queue an envelope for every member
    ///
    /// Returns once the loop has accepted the command, not once delivered.
    pub async fn broadcast(&self, envelope: Envelope) -> Result<(), HubError> {
        self.send(HubCommand::Broadcast(envelope)).await
    }

    /// Number of members after every previously submitted command
    pub async fn active_count(&self) -> Result<usize, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::ActiveCount(reply)).await?;
        Ok(rx.await?)
    }

    /// Close every connection and stop the loop
    pub async fn shutdown(&self) -> Result<(), HubError> {
        self.send(HubCommand::Shutdown).await
    }

    /// Install the inbound handler, replacing any previous one
    pub fn on_message(&self, handler: Arc<dyn MessageHandler>) {
        self.handler.install(handler);
    }

    /// Decode an inbound frame and pass it to the handler
    ///
    /// Frames that fail to decode, or arrive with no handler installed, are dropped.
    pub fn receive(&self, text: &str) {
        let envelope = match Envelope::from_json(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable frame");
                return;
            }
        };

        match self.handler.current() {
            Some(handler) => handler.handle(envelope),
            None => tracing::debug!(kind = %envelope.kind(), "No handler installed, frame dropped"),
        }
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(HubError::from)
    }
}

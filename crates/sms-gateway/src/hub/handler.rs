//! Inbound message handling

use std::sync::Arc;

use parking_lot::RwLock;
use sms_core::Envelope;

/// Receives every envelope decoded from an observer frame
///
/// Called on the reader task of the connection that sent the frame, so
/// implementations hand slow work off to their own tasks.
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(&self, envelope: Envelope);
}

impl<F> MessageHandler for F
where
    F: Fn(Envelope) + Send + Sync + 'static,
{
    fn handle(&self, envelope: Envelope) {
        self(envelope);
    }
}

/// The single installed handler, shared by every handle to the hub
#[derive(Clone, Default)]
pub(crate) struct HandlerSlot(Arc<RwLock<Option<Arc<dyn MessageHandler>>>>);

impl HandlerSlot {
    pub(crate) fn install(&self, handler: Arc<dyn MessageHandler>) {
        *self.0.write() = Some(handler);
    }

    pub(crate) fn current(&self) -> Option<Arc<dyn MessageHandler>> {
        self.0.read().clone()
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("installed", &self.0.read().is_some())
            .finish()
    }
}

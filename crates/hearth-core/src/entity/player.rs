use std::fmt;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::entity::{AddressableEntity, DeliveryError, EntityError, EntityId, Message};

/// Sending half of an entity's outbound queue.
#[derive(Debug, Clone)]
pub struct Session {
    outbound: UnboundedSender<Vec<u8>>,
}

impl Session {
    /// Create a session together with the receiver the transport drains.
    pub fn channel() -> (Session, SessionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session { outbound: tx }, SessionReceiver { inbound: rx })
    }

    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }
}

/// Receiving half of an entity's outbound queue, held by whatever transport
/// writes payloads to the client.
#[derive(Debug)]
pub struct SessionReceiver {
    inbound: UnboundedReceiver<Vec<u8>>,
}

impl SessionReceiver {
    /// Next queued payload, if one is ready
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.inbound.try_recv().ok()
    }

    /// Wait for the next payload. Returns `None` once the session is gone and
    /// the queue is empty.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.inbound.recv().await
    }

    /// Take every payload queued so far, in send order
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Ok(payload) = self.inbound.try_recv() {
            out.push(payload);
        }
        out
    }
}

/// A connected player, the host's addressable entity
pub struct Player {
    id: EntityId,
    name: String,
    display_name: RwLock<String>,
    session: RwLock<Option<Session>>,
    max_message_bytes: usize,
}

impl Player {
    /// Create a player without a session. The display name starts out equal to
    /// the canonical name.
    pub fn new(id: EntityId, name: &str, max_message_bytes: usize) -> Result<Self, EntityError> {
        if name.is_empty() {
            return Err(EntityError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            display_name: RwLock::new(name.to_string()),
            session: RwLock::new(None),
            max_message_bytes,
        })
    }

    pub fn set_display_name(&self, display_name: impl Into<String>) {
        *self.display_name.write().unwrap_or_else(PoisonError::into_inner) = display_name.into();
    }

    /// Bind (or replace) the outbound session
    pub fn bind_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the session binding. Later sends fail with [`DeliveryError::Disconnected`].
    pub fn unbind_session(&self) {
        self.session.write().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub fn is_connected(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Session::is_open)
    }

    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl AddressableEntity for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> String {
        self.display_name.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: Message) -> Result<(), DeliveryError> {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        let session = session
            .as_ref()
            .filter(|s| s.is_open())
            .ok_or(DeliveryError::Disconnected { entity: self.id })?;

        let payload = message.encode().map_err(|e| DeliveryError::Encoding {
            entity: self.id,
            reason: e.to_string(),
        })?;
        if payload.len() > self.max_message_bytes {
            return Err(DeliveryError::Oversized {
                entity: self.id,
                size: payload.len(),
                limit: self.max_message_bytes,
            });
        }

        session
            .outbound
            .send(payload)
            .map_err(|_| DeliveryError::Disconnected { entity: self.id })?;
        log::trace!("Queued message for {} ({})", self.name, self.id);
        Ok(())
    }
}

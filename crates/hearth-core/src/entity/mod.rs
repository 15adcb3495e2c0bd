//! # Hearth Core Entities
//!
//! Addressable participants of a host session and the messages sent to them.
//!
//! - **[`EntityId`]**: 128-bit identifier, unique among live entities.
//! - **[`AddressableEntity`]**: the contract plugins program against: identity,
//!   names, and message delivery.
//! - **[`message`]**: structured text components and their wire encoding.
//! - **[`player`]**: the host's concrete entity, [`Player`], bound to an outbound
//!   [`Session`](player::Session).
//! - **[`directory`]**: the [`EntityDirectory`] lookup service handed to plugins.
pub mod directory;
pub mod error;
pub mod message;
pub mod player;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use directory::EntityDirectory;
pub use error::{DeliveryError, EntityError};
pub use message::{Message, Style, TextComponent};
pub use player::{Player, Session, SessionReceiver};

/// Globally unique identifier of an addressable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random identifier
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build an identifier from its raw 128-bit value
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A participant that can be addressed by id and receive messages.
pub trait AddressableEntity: Send + Sync + fmt::Debug {
    /// Stable identifier, never changes while the entity is live
    fn id(&self) -> EntityId;

    /// Current display name, possibly styled or empty
    fn display_name(&self) -> String;

    /// Canonical name, never empty
    fn name(&self) -> &str;

    /// Enqueue a message on the entity's session.
    fn send_message(&self, message: Message) -> Result<(), DeliveryError>;

    /// Enqueue a plain text message. Delivers the same bytes as a structured
    /// message holding a single unstyled segment with `text`.
    fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        self.send_message(Message::from(text))
    }
}

#[cfg(test)]
mod tests;

//! # Hearth Core Entity Errors
//!
//! Defines error types for addressable entities and the entity directory.
//!
//! [`DeliveryError`] is returned to the caller of a message send and never
//! affects other entities. [`EntityError`] covers directory bookkeeping such as
//! lookups of entities that are not (or no longer) connected.
use thiserror::Error;

use crate::entity::EntityId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Entity {entity} has no live session")]
    Disconnected { entity: EntityId },

    #[error("Message for entity {entity} is {size} bytes, limit is {limit}")]
    Oversized {
        entity: EntityId,
        size: usize,
        limit: usize,
    },

    #[error("Failed to encode message for entity {entity}: {reason}")]
    Encoding { entity: EntityId, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("Entity {0} not found")]
    NotFound(EntityId),

    #[error("Entity {0} is already registered")]
    DuplicateId(EntityId),

    #[error("Entity canonical name must not be empty")]
    EmptyName,
}

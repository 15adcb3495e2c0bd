//! # Hearth Core Event System Errors
//!
//! Defines error types specific to the Hearth event registry.
//!
//! [`EventSystemError`] is returned by registry operations themselves, such as
//! subscribing to a registry that has been torn down. [`HandlerError`] describes
//! a single subscribed handler that failed during a dispatch; these are collected
//! per dispatch and never abort it.
use thiserror::Error;

use crate::event::{EventKind, SubscriptionHandle};

/// Boxed error returned by event handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventSystemError {
    #[error("Event registry has been torn down")]
    RegistryClosed,

    #[error("Event dispatch is held until the host starts")]
    DispatchHeld,

    #[error("Subscription owner must be a non-empty plugin identifier")]
    InvalidOwner,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Handler {handle} of plugin '{owner}' failed on '{event_name}': {message}")]
pub struct HandlerError {
    pub handle: SubscriptionHandle,
    pub owner: String,
    pub subscribed_kind: EventKind,
    pub event_name: &'static str,
    pub message: String,
    /// The handler panicked rather than returning an error
    pub panicked: bool,
}

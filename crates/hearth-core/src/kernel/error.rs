//! # Hearth Core Kernel Errors
//!
//! Defines the error type returned by the [`Host`](crate::kernel::Host).
//!
//! [`Error`] aggregates the typed errors of every subsystem (plugin system,
//! event registry, entities, configuration) through `#[from]` conversions, and
//! adds [`Error::KernelLifecycleError`] for host phases requested out of order.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::entity::{DeliveryError, EntityError};
use crate::event::EventSystemError;
use crate::plugin_system::PluginSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A host phase was requested in the wrong order.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the host's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Load")]
    Load,
    #[error("Setup")]
    Setup,
    #[error("Start")]
    Start,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

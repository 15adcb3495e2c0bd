//! # Hearth Core
//!
//! The plugin lifecycle and event registry core of the Hearth game host.
//!
//! - [`entity`]: addressable players and the messages delivered to them.
//! - [`event`]: the typed publish/subscribe registry.
//! - [`plugin_system`]: plugin descriptors, contexts, the lifecycle state
//!   machine and the plugin registry.
//! - [`kernel`]: the [`Host`] that ties them together.
//! - [`config`]: the host configuration file.
pub mod config;
pub mod entity;
pub mod event;
pub mod kernel;
pub mod plugin_system;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and plugins
pub use config::{ConfigError, HostConfig, PluginEntry};
pub use entity::{AddressableEntity, EntityDirectory, EntityId, Message, Player, TextComponent};
pub use event::{Event, EventKind, EventRegistry};
pub use kernel::error::Error as KernelError;
pub use kernel::{Host, HostPhase};
pub use plugin_system::{Plugin, PluginContext, PluginDescriptor, PluginError, PluginState};

#[cfg(test)]
mod tests;

//! # Hearth Core Plugin System
//!
//! Infrastructure for extending a Hearth host with plugins that are compiled
//! into the host process and registered through descriptors.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`descriptor`]**: [`PluginDescriptor`], the identifier, settings, optional
//!   API requirement and factory of a single plugin.
//! - **[`context`]**: [`PluginContext`], handed to the factory and to every hook.
//!   It carries a [`PluginEvents`] handle scoped to the plugin, the entity
//!   directory and the plugin's settings.
//! - **[`traits`]**: the [`Plugin`] trait with its `setup`, `start` and `shutdown`
//!   hooks, and [`PluginError`].
//! - **[`lifecycle`]**: the per-instance state machine ([`PluginState`]) and
//!   [`PluginInstance`], which refuses out-of-order transitions.
//! - **[`registry`]**: [`PluginRegistry`], which loads descriptor batches all or
//!   nothing and drives lifecycle operations across every instance.
//! - **[`error`]**: [`PluginSystemError`] and [`LifecycleError`].
pub mod context;
pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod traits;

pub use context::{PluginContext, PluginEvents};
pub use descriptor::{PluginDescriptor, PluginFactory};
pub use error::{LifecycleError, PluginSystemError};
pub use lifecycle::{LifecycleOperation, PluginInstance, PluginState};
pub use registry::{PhaseReport, PluginRegistry};
pub use traits::{Plugin, PluginError};

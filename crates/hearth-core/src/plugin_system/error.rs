//! # Hearth Core Plugin System Errors
//!
//! Defines error types specific to the Hearth Plugin System.
//!
//! [`PluginSystemError`] covers everything the host can reject while loading a
//! batch of plugin descriptors (bad or duplicate identifiers, API mismatches,
//! failing factories) and the failures of individual lifecycle hooks.
//! [`LifecycleError`] is the narrower error returned when a lifecycle transition
//! is requested from the wrong state; the instance is left untouched in that case.
use crate::plugin_system::lifecycle::{LifecycleOperation, PluginState};
use crate::plugin_system::traits::PluginError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Plugin '{plugin_id}' cannot {operation}: expected state {expected}, found {actual}")]
pub struct LifecycleError {
    pub plugin_id: String,
    pub operation: LifecycleOperation,
    pub expected: PluginState,
    pub actual: PluginState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin identifier '{plugin_id}' is already in use")]
    DuplicateIdentifier { plugin_id: String },

    #[error("Plugin descriptor at position {position} has an empty identifier")]
    InvalidIdentifier { position: usize },

    #[error("Plugin '{plugin_id}' requires API {required}, host provides {api_version}")]
    IncompatibleApi {
        plugin_id: String,
        required: String,
        api_version: String,
    },

    #[error("Plugin '{plugin_id}' could not be constructed: {source}")]
    ConstructionFailed {
        plugin_id: String,
        #[source]
        source: PluginError,
    },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Plugin '{plugin_id}' failed during {operation}: {source}")]
    HookFailed {
        plugin_id: String,
        operation: LifecycleOperation,
        #[source]
        source: PluginError,
    },
}

impl PluginSystemError {
    /// Identifier of the plugin this error is about, if it names one
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            PluginSystemError::DuplicateIdentifier { plugin_id }
            | PluginSystemError::IncompatibleApi { plugin_id, .. }
            | PluginSystemError::ConstructionFailed { plugin_id, .. }
            | PluginSystemError::HookFailed { plugin_id, .. } => Some(plugin_id),
            PluginSystemError::Lifecycle(e) => Some(&e.plugin_id),
            PluginSystemError::InvalidIdentifier { .. } => None,
        }
    }
}

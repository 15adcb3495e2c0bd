use std::fmt;

use async_trait::async_trait;

use crate::entity::{DeliveryError, EntityError};
use crate::event::EventSystemError;
use crate::plugin_system::context::PluginContext;

/// Error type for plugin operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    InitError(String),
    ExecutionError(String),
    ConfigError(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::InitError(msg) => write!(f, "Plugin initialization error: {}", msg),
            PluginError::ExecutionError(msg) => write!(f, "Plugin execution error: {}", msg),
            PluginError::ConfigError(msg) => write!(f, "Plugin configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PluginError {}

impl From<EventSystemError> for PluginError {
    fn from(err: EventSystemError) -> Self {
        PluginError::ExecutionError(err.to_string())
    }
}

impl From<EntityError> for PluginError {
    fn from(err: EntityError) -> Self {
        PluginError::ExecutionError(err.to_string())
    }
}

impl From<DeliveryError> for PluginError {
    fn from(err: DeliveryError) -> Self {
        PluginError::ExecutionError(err.to_string())
    }
}

/// Core trait that all plugins must implement.
///
/// A plugin is built by the factory of its [`PluginDescriptor`](crate::plugin_system::PluginDescriptor)
/// and then driven through `setup`, `start` and `shutdown` exactly once each, in
/// that order. Each hook receives the same [`PluginContext`] the factory saw.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Register subscriptions and prepare state.
    ///
    /// Other plugins may not have been set up yet when this runs.
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError>;

    /// Called once every plugin finished setup
    async fn start(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Release resources. Subscriptions are revoked by the host right after.
    async fn shutdown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }
}

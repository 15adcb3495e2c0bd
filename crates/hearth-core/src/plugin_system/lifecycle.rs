use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::plugin_system::context::PluginContext;
use crate::plugin_system::error::{LifecycleError, PluginSystemError};
use crate::plugin_system::traits::{Plugin, PluginError};
use crate::utils::panic_message;

/// Where a plugin instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginState {
    Created,
    SetUp,
    Started,
    /// Terminal
    ShutDown,
    /// Terminal; a setup or start hook failed
    Failed,
}

impl PluginState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PluginState::ShutDown | PluginState::Failed)
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginState::Created => "Created",
            PluginState::SetUp => "SetUp",
            PluginState::Started => "Started",
            PluginState::ShutDown => "ShutDown",
            PluginState::Failed => "Failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOperation {
    Setup,
    Start,
    Shutdown,
}

impl LifecycleOperation {
    /// The only state this operation may be applied in
    pub fn source_state(&self) -> PluginState {
        match self {
            LifecycleOperation::Setup => PluginState::Created,
            LifecycleOperation::Start => PluginState::SetUp,
            LifecycleOperation::Shutdown => PluginState::Started,
        }
    }

    /// State reached when the hook succeeds
    pub fn target_state(&self) -> PluginState {
        match self {
            LifecycleOperation::Setup => PluginState::SetUp,
            LifecycleOperation::Start => PluginState::Started,
            LifecycleOperation::Shutdown => PluginState::ShutDown,
        }
    }

    /// State reached when the hook fails
    fn failure_state(&self) -> PluginState {
        match self {
            LifecycleOperation::Shutdown => PluginState::ShutDown,
            _ => PluginState::Failed,
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleOperation::Setup => "setup",
            LifecycleOperation::Start => "start",
            LifecycleOperation::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// A constructed plugin together with its context and lifecycle state.
pub struct PluginInstance {
    id: String,
    state: PluginState,
    plugin: Box<dyn Plugin>,
    context: PluginContext,
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PluginInstance {
    pub fn new(plugin: Box<dyn Plugin>, context: PluginContext) -> Self {
        Self {
            id: context.plugin_id().to_string(),
            state: PluginState::Created,
            plugin,
            context,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    pub async fn setup(&mut self) -> Result<(), PluginSystemError> {
        self.transition(LifecycleOperation::Setup).await
    }

    pub async fn start(&mut self) -> Result<(), PluginSystemError> {
        self.transition(LifecycleOperation::Start).await
    }

    pub async fn shutdown(&mut self) -> Result<(), PluginSystemError> {
        self.transition(LifecycleOperation::Shutdown).await
    }

    async fn transition(&mut self, operation: LifecycleOperation) -> Result<(), PluginSystemError> {
        let expected = operation.source_state();
        if self.state != expected {
            return Err(LifecycleError {
                plugin_id: self.id.clone(),
                operation,
                expected,
                actual: self.state,
            }
            .into());
        }

        log::debug!("Running {} hook of plugin '{}'", operation, self.id);
        let ctx = &self.context;
        let hook = match operation {
            LifecycleOperation::Setup => self.plugin.setup(ctx),
            LifecycleOperation::Start => self.plugin.start(ctx),
            LifecycleOperation::Shutdown => self.plugin.shutdown(ctx),
        };
        let outcome = match AssertUnwindSafe(hook).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(PluginError::ExecutionError(format!(
                "{} hook panicked: {}",
                operation,
                panic_message(panic.as_ref())
            ))),
        };

        match outcome {
            Ok(()) => {
                self.state = operation.target_state();
                log::info!("Plugin '{}' is now {}", self.id, self.state);
                Ok(())
            }
            Err(source) => {
                self.state = operation.failure_state();
                log::error!("Plugin '{}' {} hook failed: {}", self.id, operation, source);
                Err(PluginSystemError::HookFailed {
                    plugin_id: self.id.clone(),
                    operation,
                    source,
                })
            }
        }
    }
}

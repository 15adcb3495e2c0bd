use std::fmt;

use semver::VersionReq;
use serde_json::Value;

use crate::plugin_system::context::PluginContext;
use crate::plugin_system::traits::{Plugin, PluginError};

/// Builds a plugin from the context the host prepared for it
pub type PluginFactory =
    Box<dyn FnOnce(&PluginContext) -> Result<Box<dyn Plugin>, PluginError> + Send>;

/// What the host needs to load one plugin.
pub struct PluginDescriptor {
    id: String,
    settings: Value,
    api_requirement: Option<VersionReq>,
    factory: PluginFactory,
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("api_requirement", &self.api_requirement)
            .finish_non_exhaustive()
    }
}

impl PluginDescriptor {
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&PluginContext) -> Result<Box<dyn Plugin>, PluginError> + Send + 'static,
    {
        Self {
            id: id.into(),
            settings: Value::Null,
            api_requirement: None,
            factory: Box::new(factory),
        }
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    /// Require a host API version, checked at load time
    pub fn with_api_requirement(mut self, requirement: VersionReq) -> Self {
        self.api_requirement = Some(requirement);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &Value {
        &self.settings
    }

    pub fn api_requirement(&self) -> Option<&VersionReq> {
        self.api_requirement.as_ref()
    }

    pub(crate) fn into_parts(self) -> (String, Value, PluginFactory) {
        (self.id, self.settings, self.factory)
    }
}

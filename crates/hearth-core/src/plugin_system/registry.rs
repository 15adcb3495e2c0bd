use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use semver::Version;
use serde_json::Value;

use crate::plugin_system::context::PluginContext;
use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::lifecycle::{PluginInstance, PluginState};
use crate::plugin_system::traits::PluginError;
use crate::utils::panic_message;

/// Outcome of driving one lifecycle operation across every plugin
#[derive(Debug, Default)]
pub struct PhaseReport {
    /// Plugins whose hook succeeded, in the order they ran
    pub succeeded: Vec<String>,
    pub failed: Vec<PluginSystemError>,
}

impl PhaseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().filter_map(|e| e.plugin_id()).collect()
    }
}

/// Registry for managing plugin instances in load order
#[derive(Debug)]
pub struct PluginRegistry {
    instances: Vec<PluginInstance>,
    api_version: Version,
}

impl PluginRegistry {
    /// Create a new plugin registry with the specified API version
    pub fn new(api_version: Version) -> Self {
        Self {
            instances: Vec::new(),
            api_version,
        }
    }

    pub fn api_version(&self) -> &Version {
        &self.api_version
    }

    /// Construct and register one instance per descriptor, preserving order.
    ///
    /// The batch is validated as a whole first; if any descriptor is rejected or
    /// any factory fails, nothing from the batch is registered and every
    /// subscription made by the batch's factories is revoked.
    pub fn load_all<F>(
        &mut self,
        descriptors: Vec<PluginDescriptor>,
        mut make_context: F,
    ) -> Result<usize, PluginSystemError>
    where
        F: FnMut(&str, Value) -> PluginContext,
    {
        self.validate(&descriptors)?;

        let mut built: Vec<PluginInstance> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let (id, settings, factory) = descriptor.into_parts();
            let context = make_context(&id, settings);

            let constructed = match panic::catch_unwind(AssertUnwindSafe(|| factory(&context))) {
                Ok(result) => result,
                Err(panic) => Err(PluginError::InitError(format!(
                    "factory panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            };

            match constructed {
                Ok(plugin) => built.push(PluginInstance::new(plugin, context)),
                Err(source) => {
                    log::error!("Failed to construct plugin '{}': {}", id, source);
                    context.events().revoke_all();
                    for instance in &built {
                        instance.context().events().revoke_all();
                    }
                    return Err(PluginSystemError::ConstructionFailed {
                        plugin_id: id,
                        source,
                    });
                }
            }
        }

        let count = built.len();
        for instance in &built {
            log::info!("Loaded plugin '{}'", instance.id());
        }
        self.instances.extend(built);
        Ok(count)
    }

    fn validate(&self, descriptors: &[PluginDescriptor]) -> Result<(), PluginSystemError> {
        let mut seen: HashSet<&str> = self.instances.iter().map(|i| i.id()).collect();
        for (position, descriptor) in descriptors.iter().enumerate() {
            let id = descriptor.id();
            if id.is_empty() {
                return Err(PluginSystemError::InvalidIdentifier { position });
            }
            if !seen.insert(id) {
                return Err(PluginSystemError::DuplicateIdentifier {
                    plugin_id: id.to_string(),
                });
            }
            if let Some(requirement) = descriptor.api_requirement() {
                if !requirement.matches(&self.api_version) {
                    return Err(PluginSystemError::IncompatibleApi {
                        plugin_id: id.to_string(),
                        required: requirement.to_string(),
                        api_version: self.api_version.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Run `setup` on every created instance in load order.
    ///
    /// A failed instance has its partial subscriptions revoked; the others continue.
    pub async fn setup_all(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();
        for instance in self.instances.iter_mut() {
            if instance.state() != PluginState::Created {
                continue;
            }
            match instance.setup().await {
                Ok(()) => report.succeeded.push(instance.id().to_string()),
                Err(e) => {
                    instance.context().events().revoke_all();
                    report.failed.push(e);
                }
            }
        }
        report
    }

    /// Run `start` on every set-up instance in load order
    pub async fn start_all(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();
        for instance in self.instances.iter_mut() {
            if instance.state() != PluginState::SetUp {
                continue;
            }
            match instance.start().await {
                Ok(()) => report.succeeded.push(instance.id().to_string()),
                Err(e) => {
                    instance.context().events().revoke_all();
                    report.failed.push(e);
                }
            }
        }
        report
    }

    /// Shut down started instances in reverse load order.
    ///
    /// Every instance has its subscriptions revoked right after its hook ran,
    /// or immediately if it was never started.
    pub async fn shutdown_all(&mut self) -> PhaseReport {
        let mut report = PhaseReport::default();
        for instance in self.instances.iter_mut().rev() {
            if instance.state() == PluginState::Started {
                match instance.shutdown().await {
                    Ok(()) => report.succeeded.push(instance.id().to_string()),
                    Err(e) => {
                        log::warn!("Error shutting down plugin '{}': {}", instance.id(), e);
                        report.failed.push(e);
                    }
                }
            }
            let revoked = instance.context().events().revoke_all();
            if revoked > 0 {
                log::debug!("Revoked {} subscription(s) of plugin '{}'", revoked, instance.id());
            }
        }
        report
    }

    pub fn get(&self, id: &str) -> Option<&PluginInstance> {
        self.instances.iter().find(|i| i.id() == id)
    }

    pub fn state(&self, id: &str) -> Option<PluginState> {
        self.get(id).map(|i| i.state())
    }

    /// Plugin identifiers in load order
    pub fn ids(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.id().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of instances currently in `state`
    pub fn count_in(&self, state: PluginState) -> usize {
        self.instances.iter().filter(|i| i.state() == state).count()
    }
}

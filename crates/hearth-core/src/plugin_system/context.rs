use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::entity::{EntityDirectory, EntityError, EntityId, Player};
use crate::event::{
    BoxError, DispatchReport, Event, EventHandler, EventKind, EventRegistry, EventSystemError,
    SubscriptionHandle, sync_handler,
};
use crate::plugin_system::traits::PluginError;

/// A plugin's view of the host event registry.
///
/// Every subscription made through this handle is owned by the plugin, which
/// lets the host revoke all of them at once.
#[derive(Clone)]
pub struct PluginEvents {
    owner: String,
    registry: Arc<EventRegistry>,
}

impl fmt::Debug for PluginEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEvents")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl PluginEvents {
    pub fn new(owner: impl Into<String>, registry: Arc<EventRegistry>) -> Self {
        Self {
            owner: owner.into(),
            registry,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> Result<SubscriptionHandle, EventSystemError> {
        self.registry.subscribe(kind, &self.owner, handler)
    }

    /// Subscribe a synchronous closure
    pub fn on<F>(&self, kind: EventKind, f: F) -> Result<SubscriptionHandle, EventSystemError>
    where
        F: Fn(&Event) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribe(kind, sync_handler(f))
    }

    pub async fn publish(&self, event: &Event) -> Result<DispatchReport, EventSystemError> {
        self.registry.publish(event).await
    }

    /// Remove one of this plugin's own subscriptions.
    ///
    /// Handles owned by other plugins are left alone and report `false`.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        if !self.registry.subscriptions_of(&self.owner).contains(&handle) {
            return false;
        }
        self.registry.unsubscribe(handle)
    }

    /// Remove every subscription of this plugin
    pub fn revoke_all(&self) -> usize {
        self.registry.unsubscribe_all(&self.owner)
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.subscriptions_of(&self.owner).len()
    }
}

/// Everything a plugin receives from the host at construction.
#[derive(Clone)]
pub struct PluginContext {
    plugin_id: String,
    events: PluginEvents,
    entities: Arc<EntityDirectory>,
    settings: Value,
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_id", &self.plugin_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PluginContext {
    pub fn new(
        plugin_id: impl Into<String>,
        registry: Arc<EventRegistry>,
        entities: Arc<EntityDirectory>,
        settings: Value,
    ) -> Self {
        let plugin_id = plugin_id.into();
        Self {
            events: PluginEvents::new(plugin_id.clone(), registry),
            plugin_id,
            entities,
            settings,
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn events(&self) -> &PluginEvents {
        &self.events
    }

    pub fn entities(&self) -> &Arc<EntityDirectory> {
        &self.entities
    }

    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// Deserialize a top-level settings key.
    ///
    /// Returns `Ok(None)` when the key is absent or the settings are not an object.
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PluginError> {
        match self.settings.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| {
                    PluginError::ConfigError(format!(
                        "setting '{}' of plugin '{}': {}",
                        key, self.plugin_id, e
                    ))
                }),
        }
    }

    pub fn lookup_entity(&self, id: EntityId) -> Result<Arc<Player>, EntityError> {
        self.entities.lookup(id)
    }
}

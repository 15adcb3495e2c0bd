//! Plugins compiled into the `hearth` binary.
use hearth_core::config::{HostConfig, PluginEntry};
use hearth_core::plugin_system::PluginDescriptor;
use hearth_plugin_economy::Ledger;

/// Identifiers of every built-in plugin, in default load order
pub const BUILT_IN: &[&str] = &[hearth_plugin_chat::PLUGIN_ID, hearth_plugin_economy::PLUGIN_ID];

pub fn is_built_in(id: &str) -> bool {
    BUILT_IN.contains(&id)
}

fn descriptor_for(entry: &PluginEntry) -> Option<PluginDescriptor> {
    match entry.id.as_str() {
        hearth_plugin_chat::PLUGIN_ID => Some(hearth_plugin_chat::descriptor_with(entry.settings.clone())),
        hearth_plugin_economy::PLUGIN_ID => Some(hearth_plugin_economy::descriptor_with(
            entry.settings.clone(),
            Ledger::new(),
        )),
        _ => None,
    }
}

/// Entries the host should load: the enabled config entries, or every
/// built-in plugin with default settings when the config lists none.
pub fn entries(config: &HostConfig) -> Vec<PluginEntry> {
    if config.plugins.is_empty() {
        BUILT_IN.iter().map(|id| PluginEntry::new(*id)).collect()
    } else {
        config.enabled_plugins().cloned().collect()
    }
}

/// Build descriptors for [`entries`], failing on the first unknown plugin
pub fn resolve(config: &HostConfig) -> Result<Vec<PluginDescriptor>, String> {
    entries(config)
        .iter()
        .map(|entry| {
            descriptor_for(entry).ok_or_else(|| {
                format!(
                    "unknown plugin '{}' (built-in plugins: {})",
                    entry.id,
                    BUILT_IN.join(", ")
                )
            })
        })
        .collect()
}

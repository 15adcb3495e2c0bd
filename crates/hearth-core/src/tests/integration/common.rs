#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::event::EventKind;
use crate::plugin_system::{LifecycleOperation, Plugin, PluginContext, PluginDescriptor, PluginError};

/// Shared, ordered log of "<plugin>:<operation>" entries
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

// ===== MOCK PLUGINS =====

/// A test plugin that journals each hook and subscribes to player events
pub struct TrackingPlugin {
    name: String,
    journal: Journal,
    fail_on: Option<LifecycleOperation>,
}

impl TrackingPlugin {
    fn record(&self, op: LifecycleOperation) -> Result<(), PluginError> {
        self.journal.lock().unwrap().push(format!("{}:{}", self.name, op));
        match self.fail_on {
            Some(f) if f == op => Err(PluginError::ExecutionError(format!("{} refused to {}", self.name, op))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Plugin for TrackingPlugin {
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        ctx.events().on(EventKind::AnyPlayer, |_| Ok(()))?;
        self.record(LifecycleOperation::Setup)
    }

    async fn start(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        self.record(LifecycleOperation::Start)
    }

    async fn shutdown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        self.record(LifecycleOperation::Shutdown)
    }
}

pub fn tracking(name: &str, journal: &Journal) -> PluginDescriptor {
    tracking_failing(name, journal, None)
}

pub fn tracking_failing(
    name: &str,
    journal: &Journal,
    fail_on: Option<LifecycleOperation>,
) -> PluginDescriptor {
    let journal = journal.clone();
    let name_owned = name.to_string();
    PluginDescriptor::new(name, move |_ctx: &PluginContext| {
        Ok(Box::new(TrackingPlugin {
            name: name_owned,
            journal,
            fail_on,
        }) as Box<dyn Plugin>)
    })
}

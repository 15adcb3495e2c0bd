//! # Hearth Core Event System
//!
//! Typed publish/subscribe hub shared by the host and its plugins.
//!
//! Events form a closed set ([`Event`]) tagged by [`EventKind`]. Kinds are
//! arranged in a small hierarchy so a plugin can subscribe to a whole category
//! (every player event, every host event, or everything). The
//! [`EventRegistry`] dispatches synchronously per publish call, in registration
//! order, and isolates failing handlers: their errors are collected and handed
//! to a [`DiagnosticSink`] once the dispatch is complete.
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod types;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use diagnostics::{DiagnosticSink, LogSink, RecordingSink};
pub use dispatcher::{DispatchReport, EventRegistry, sync_handler};
pub use error::{BoxError, EventSystemError, HandlerError};
pub use types::{CustomEvent, Event, EventKind, PlayerChatEvent, PlayerJoinEvent, PlayerQuitEvent};

/// Identifier of a single subscription, unique within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionHandle(pub(crate) u64);

impl SubscriptionHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous event handler trait
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<(), BoxError>;
}

// Test module declaration
#[cfg(test)]
mod tests;

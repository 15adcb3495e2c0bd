use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::FutureExt;

use crate::event::{
    BoxError, DiagnosticSink, Event, EventHandler, EventKind, EventSystemError, HandlerError,
    LogSink, SubscriptionHandle,
};
use crate::utils::panic_message;

struct Subscription {
    handle: SubscriptionHandle,
    kind: EventKind,
    owner: String,
    handler: Arc<dyn EventHandler>,
}

struct RegistryState {
    // registration order is dispatch order
    subscriptions: Vec<Subscription>,
    next_handle: u64,
    // subscribe is allowed while held, publish is not
    held: bool,
    closed: bool,
}

/// Outcome of a single [`EventRegistry::publish`] call
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub event_name: &'static str,
    /// Number of handlers invoked, failed ones included
    pub invoked: usize,
    pub failures: Vec<HandlerError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The host's event registry.
///
/// Shared behind an `Arc`; every method takes `&self`. A publish call works on a
/// snapshot of the subscriptions taken when it begins, so a subscription added
/// or removed concurrently is either fully part of that dispatch or not at all.
pub struct EventRegistry {
    state: RwLock<RegistryState>,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("EventRegistry")
            .field("subscriptions", &state.subscriptions.len())
            .field("next_handle", &state.next_handle)
            .field("held", &state.held)
            .field("closed", &state.closed)
            .finish()
    }
}

impl EventRegistry {
    /// Create a registry that reports handler failures to the log
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                subscriptions: Vec::new(),
                next_handle: 1,
                held: false,
                closed: false,
            }),
            sink,
        }
    }

    /// Register `handler` for events covered by `kind` on behalf of `owner`.
    pub fn subscribe(
        &self,
        kind: EventKind,
        owner: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<SubscriptionHandle, EventSystemError> {
        if owner.is_empty() {
            return Err(EventSystemError::InvalidOwner);
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return Err(EventSystemError::RegistryClosed);
        }
        let handle = SubscriptionHandle(state.next_handle);
        state.next_handle += 1;
        state.subscriptions.push(Subscription {
            handle,
            kind,
            owner: owner.to_string(),
            handler,
        });
        log::debug!("Plugin '{}' subscribed {} to {}", owner, handle, kind);
        Ok(handle)
    }

    /// Stop accepting publish calls until [`open_dispatch`](Self::open_dispatch).
    ///
    /// Subscriptions can still be made while dispatch is held.
    pub fn hold_dispatch(&self) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).held = true;
    }

    /// Let publish calls through again
    pub fn open_dispatch(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.held {
            state.held = false;
            log::debug!("Event dispatch opened");
        }
    }

    pub fn is_dispatching(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        !state.held && !state.closed
    }

    /// Remove a single subscription. Returns whether it existed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.handle != handle);
        state.subscriptions.len() < before
    }

    /// Remove every subscription owned by `owner`. Returns how many were removed.
    pub fn unsubscribe_all(&self, owner: &str) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.owner != owner);
        let removed = before - state.subscriptions.len();
        if removed > 0 {
            log::debug!("Removed {} subscription(s) of plugin '{}'", removed, owner);
        }
        removed
    }

    /// Dispatch `event` to every matching subscriber in registration order.
    ///
    /// Fails with [`EventSystemError::DispatchHeld`] while dispatch is held and
    /// no handler runs.
    ///
    /// A handler that returns an error or panics does not stop the dispatch.
    /// Failures are reported to the diagnostic sink after the last handler ran
    /// and are also returned in the [`DispatchReport`].
    pub async fn publish(&self, event: &Event) -> Result<DispatchReport, EventSystemError> {
        let kind = event.kind();
        let targets: Vec<(SubscriptionHandle, EventKind, String, Arc<dyn EventHandler>)> = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.closed {
                return Err(EventSystemError::RegistryClosed);
            }
            if state.held {
                return Err(EventSystemError::DispatchHeld);
            }
            state
                .subscriptions
                .iter()
                .filter(|s| kind.is_covered_by(s.kind))
                .map(|s| (s.handle, s.kind, s.owner.clone(), s.handler.clone()))
                .collect()
        };

        let mut failures = Vec::new();
        for (handle, subscribed_kind, owner, handler) in &targets {
            let outcome = AssertUnwindSafe(handler.handle(event)).catch_unwind().await;
            let (message, panicked) = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => (e.to_string(), false),
                Err(panic) => (
                    format!("handler panicked: {}", panic_message(panic.as_ref())),
                    true,
                ),
            };
            failures.push(HandlerError {
                handle: *handle,
                owner: owner.clone(),
                subscribed_kind: *subscribed_kind,
                event_name: event.name(),
                message,
                panicked,
            });
        }

        for failure in &failures {
            self.sink.report(failure);
        }

        Ok(DispatchReport {
            event_name: event.name(),
            invoked: targets.len(),
            failures,
        })
    }

    /// Drop every subscription and refuse further subscribe/publish calls.
    pub fn teardown(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return;
        }
        state.closed = true;
        let dropped = state.subscriptions.len();
        state.subscriptions.clear();
        log::info!("Event registry torn down ({} subscription(s) dropped)", dropped);
    }

    pub fn is_live(&self) -> bool {
        !self.state.read().unwrap_or_else(PoisonError::into_inner).closed
    }

    pub fn subscription_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).subscriptions.len()
    }

    /// Handles owned by `owner`, in registration order
    pub fn subscriptions_of(&self, owner: &str) -> Vec<SubscriptionHandle> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .iter()
            .filter(|s| s.owner == owner)
            .map(|s| s.handle)
            .collect()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter turning a synchronous closure into an [`EventHandler`]
struct SyncHandler<F> {
    handler: F,
}

#[async_trait]
impl<F> EventHandler for SyncHandler<F>
where
    F: Fn(&Event) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn handle(&self, event: &Event) -> Result<(), BoxError> {
        (self.handler)(event)
    }
}

/// Helper function to create synchronous handlers that are compatible with async system
pub fn sync_handler<F>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&Event) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(SyncHandler { handler: f })
}

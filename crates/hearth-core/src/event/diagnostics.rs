use std::sync::{Mutex, PoisonError};

use crate::event::HandlerError;

/// Receives handler failures after each dispatch completes
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &HandlerError);
}

/// Sink that writes failures to the log at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, error: &HandlerError) {
        log::error!("{}", error);
    }
}

/// Sink that logs failures and keeps them for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    failures: Mutex<Vec<HandlerError>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every failure reported so far
    pub fn failures(&self) -> Vec<HandlerError> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, error: &HandlerError) {
        LogSink.report(error);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}

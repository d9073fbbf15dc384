//! Diagnostic context and sink
//!
//! The engine never logs through ambient state. Callers hand it a base
//! [`DiagnosticContext`], which is extended by value for each tick and
//! attached to every published result and every notice sent to the
//! [`DiagnosticSink`].

use std::fmt;
use tracing::Level;

/// Ordered set of structured key/value fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    fields: Vec<(&'static str, String)>,
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context with `key` set to `value`.
    ///
    /// An existing field with the same key is replaced in place.
    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => field.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Receives engine notices (transient errors, skipped transactions,
/// system events). Presentation is up to the implementation.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, level: Level, context: &DiagnosticContext, message: &str);
}

/// Sink that forwards notices to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, level: Level, context: &DiagnosticContext, message: &str) {
        match level {
            Level::ERROR => tracing::error!(context = %context, "{}", message),
            Level::WARN => tracing::warn!(context = %context, "{}", message),
            Level::INFO => tracing::info!(context = %context, "{}", message),
            Level::DEBUG => tracing::debug!(context = %context, "{}", message),
            _ => tracing::trace!(context = %context, "{}", message),
        }
    }
}

//! Threshold alerting.
//!
//! Workers report error messages into a shared buffer. When the buffer
//! reaches the configured threshold it is drained into one [`AlertPayload`]
//! and handed to an [`AlertNotifier`]. Delivery happens outside the buffer
//! lock and is never retried.

pub mod webhook;

pub use webhook::WebhookNotifier;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::NotifyError;

/// Snapshot of buffered errors taken at flush time. Serializes as
/// `{"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertPayload {
    pub errors: Vec<String>,
}

pub trait AlertNotifier: Send + Sync {
    fn notify(&self, payload: &AlertPayload) -> Result<(), NotifyError>;

    /// Human-readable name for logs (e.g. "webhook").
    fn channel_name(&self) -> &str;
}

/// Used when no webhook target is configured: alerts only reach the log.
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        warn!(
            count = payload.errors.len(),
            "Error threshold reached, no webhook configured: {}",
            payload.errors.join(" | ")
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

pub struct AlertAggregator {
    threshold: usize,
    buffer: Mutex<Vec<String>>,
    notifier: Arc<dyn AlertNotifier>,
}

impl AlertAggregator {
    /// # Panics
    /// Panics if `threshold` is 0.
    pub fn new(threshold: usize, notifier: Arc<dyn AlertNotifier>) -> Self {
        assert!(threshold > 0, "error threshold must be > 0");
        Self {
            threshold,
            buffer: Mutex::new(Vec::with_capacity(threshold)),
            notifier,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Buffers one message. Returns true if this call triggered a flush.
    pub fn report_error(&self, message: impl Into<String>) -> bool {
        let payload = {
            let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
            buffer.push(message.into());
            if buffer.len() >= self.threshold {
                Some(AlertPayload {
                    errors: std::mem::take(&mut *buffer),
                })
            } else {
                None
            }
        };

        match payload {
            Some(payload) => {
                self.deliver(&payload);
                true
            }
            None => false,
        }
    }

    /// Sends whatever is still buffered, if anything. Returns the number of
    /// messages handed to the notifier.
    pub fn flush_remaining(&self) -> usize {
        let errors = {
            let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *buffer)
        };
        if errors.is_empty() {
            return 0;
        }

        let count = errors.len();
        self.deliver(&AlertPayload { errors });
        count
    }

    pub fn pending(&self) -> usize {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn deliver(&self, payload: &AlertPayload) {
        match self.notifier.notify(payload) {
            Ok(()) => info!(
                channel = self.notifier.channel_name(),
                "Sent {} notifications successfully.",
                payload.errors.len()
            ),
            Err(e) => error!(
                channel = self.notifier.channel_name(),
                "Failed to send notifications: {}", e
            ),
        }
    }
}

/// Notifier that keeps every payload, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub payloads: Mutex<Vec<AlertPayload>>,
    pub fail: bool,
}

#[cfg(test)]
impl AlertNotifier for RecordingNotifier {
    fn notify(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        self.payloads.lock().unwrap().push(payload.clone());
        if self.fail {
            Err(NotifyError::Status(503))
        } else {
            Ok(())
        }
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

//! HTTP webhook delivery of alert payloads.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::alert::{AlertNotifier, AlertPayload};
use crate::error::NotifyError;
use crate::sanitize;

/// Posts payloads as JSON to a fixed endpoint. Any 2xx answer counts as
/// delivered.
pub struct WebhookNotifier {
    url: SecretString,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: SecretString, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { url, client })
    }
}

impl AlertNotifier for WebhookNotifier {
    fn notify(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        let url = self.url.expose_secret();
        debug!(
            endpoint = %sanitize::redact_url(url),
            count = payload.errors.len(),
            "Posting alert payload"
        );

        let response = self.client.post(url).json(payload).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

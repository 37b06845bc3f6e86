// src/delivery/webhook.rs

//! Chat webhook sink.
//!
//! Posts `{"content": "<payload text>"}` to every destination URL at once.

use async_trait::async_trait;
use futures::future;
use reqwest::Client;
use serde::Serialize;

use crate::delivery::DeliverySink;
use crate::error::{AppError, Result};
use crate::models::NotificationPayload;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

pub struct WebhookSink {
    client: Client,
}

impl WebhookSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn post(&self, destination: &str, message: &WebhookMessage<'_>) -> Result<()> {
        let response = self
            .client
            .post(destination)
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::delivery(redact(destination), e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::delivery(redact(destination), status));
        }
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    async fn deliver(&self, payload: &NotificationPayload, destinations: &[String]) -> Result<()> {
        let message = WebhookMessage {
            content: &payload.text,
        };

        let results = future::join_all(
            destinations
                .iter()
                .map(|destination| self.post(destination, &message)),
        )
        .await;

        let failures: Vec<AppError> = results.into_iter().filter_map(|r| r.err()).collect();
        for failure in &failures {
            log::warn!("{}", failure);
        }

        match failures.len() {
            0 => Ok(()),
            n => Err(AppError::delivery(
                format!("{n} of {} destinations", destinations.len()),
                format!("{} for {}", failures[0], payload.apply_link),
            )),
        }
    }
}

/// Webhook URLs embed their secret token; keep only scheme and host for logs.
fn redact(destination: &str) -> String {
    match url::Url::parse(destination) {
        Ok(url) => format!("{}://{}/…", url.scheme(), url.host_str().unwrap_or("?")),
        Err(_) => "<invalid url>".to_string(),
    }
}

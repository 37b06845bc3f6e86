//! Notification delivery.
//!
//! A sink hands one rendered payload to every configured destination.
//! Delivery failures are reported to the caller but never undo deduplication:
//! the link was already recorded before rendering.

pub mod console;
pub mod webhook;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{DeliveryConfig, NotificationPayload, SinkKind};

pub use console::ConsoleSink;
pub use webhook::WebhookSink;

#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, payload: &NotificationPayload, destinations: &[String]) -> Result<()>;
}

/// Build the sink selected in the delivery configuration.
pub fn sink_for(config: &DeliveryConfig, client: Client) -> Box<dyn DeliverySink> {
    match config.sink {
        SinkKind::Webhook => Box::new(WebhookSink::new(client)),
        SinkKind::Console => Box::new(ConsoleSink),
    }
}

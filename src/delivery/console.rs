//! Stdout sink, for dry runs and local testing.

use async_trait::async_trait;

use crate::delivery::DeliverySink;
use crate::error::Result;
use crate::models::NotificationPayload;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl DeliverySink for ConsoleSink {
    async fn deliver(&self, payload: &NotificationPayload, _destinations: &[String]) -> Result<()> {
        println!("{}", payload.text);
        Ok(())
    }
}

use async_trait::async_trait;

/// Outbound notification sink (webhook-style endpoint).
///
/// Implementations must be skippable: when no endpoint is configured,
/// `publish` is a no-op success. Callers treat delivery as best-effort and
/// never let a sink failure affect the operation that triggered it.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(
        &self,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Sink that drops every event. Stands in when notifications are disabled.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn publish(
        &self,
        _event: &str,
        _payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

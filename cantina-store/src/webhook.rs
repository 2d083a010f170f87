use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use cantina_core::NotificationSink;

use crate::app_config::WebhookConfig;

type HmacSha256 = Hmac<Sha256>;

/// Best-effort webhook delivery to a configured endpoint.
///
/// Unconfigured (no url) means every publish is a silent no-op. With a
/// shared secret configured, payloads are signed so the receiver can
/// verify origin and freshness.
pub struct WebhookSink {
    client: reqwest::Client,
    url: Option<String>,
    secret: Option<String>,
}

impl WebhookSink {
    pub fn from_config(cfg: &WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;

        let url = match &cfg.url {
            Some(url) if is_http_url(url) => Some(url.clone()),
            Some(url) => {
                tracing::error!("ignoring webhook url {url:?}: must be http or https");
                None
            }
            None => None,
        };

        Ok(Self {
            client,
            url,
            secret: cfg.secret.clone(),
        })
    }

    /// Disabled sink; used where notifications are turned off outright.
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
            secret: None,
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    match reqwest::Url::parse(raw) {
        Ok(parsed) => parsed.scheme() == "http" || parsed.scheme() == "https",
        Err(_) => false,
    }
}

/// `v1=<hex hmac-sha256>` over `"{timestamp}.{request_id}.{body}"`.
fn sign(secret: &str, timestamp: &str, request_id: &str, body: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{timestamp}.{request_id}.{body}").as_bytes());
    Some(format!("v1={}", hex::encode(mac.finalize().into_bytes())))
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn publish(
        &self,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(url) = &self.url else {
            return Ok(());
        };

        let timestamp = Utc::now().to_rfc3339();
        let request_id = Uuid::new_v4().to_string();

        let envelope = serde_json::json!({
            "event": event,
            "data": payload,
            "timestamp": timestamp,
            "requestId": request_id,
        });
        let body = serde_json::to_string(&envelope)?;

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Webhook-Event", event)
            .header("X-Webhook-Timestamp", timestamp.as_str())
            .header("X-Webhook-Request-Id", request_id.as_str());

        if let Some(secret) = &self.secret {
            if let Some(signature) = sign(secret, &timestamp, &request_id, &body) {
                request = request.header("X-Webhook-Signature", signature);
            }
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            tracing::warn!("webhook endpoint answered {} for {event}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_format_is_versioned_hex() {
        let signature = sign("secret", "2026-02-01T12:00:00Z", "req-1", "{}").unwrap();
        assert!(signature.starts_with("v1="));
        let digest = &signature[3..];
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_is_deterministic_and_input_sensitive() {
        let a = sign("secret", "ts", "id", "body").unwrap();
        let b = sign("secret", "ts", "id", "body").unwrap();
        let c = sign("secret", "ts", "id", "other").unwrap();
        let d = sign("other", "ts", "id", "body").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_non_http_urls_are_rejected() {
        assert!(is_http_url("https://hooks.example.org/cafeteria"));
        assert!(is_http_url("http://localhost:5678/webhook"));
        assert!(!is_http_url("ftp://example.org"));
        assert!(!is_http_url("not a url"));
    }

    #[tokio::test]
    async fn test_unconfigured_sink_is_a_no_op() {
        let sink = WebhookSink::disabled();
        sink.publish("order.created", serde_json::json!({"id": 1}))
            .await
            .unwrap();
    }
}

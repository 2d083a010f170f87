use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Outbound notification endpoint. Leaving `url` unset disables the sink
/// entirely; `secret` additionally enables payload signing.
#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub secret: Option<String>,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            secret: None,
            timeout_seconds: default_webhook_timeout(),
        }
    }
}

fn default_webhook_timeout() -> u64 {
    3
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of CANTINA)
            // Eg.. `CANTINA_SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("CANTINA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_config_defaults_to_disabled() {
        let cfg = WebhookConfig::default();
        assert!(cfg.url.is_none());
        assert!(cfg.secret.is_none());
        assert_eq!(cfg.timeout_seconds, 3);
    }

    #[test]
    fn test_webhook_timeout_default_applies_when_deserialized() {
        let cfg: WebhookConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.timeout_seconds, 3);
    }
}

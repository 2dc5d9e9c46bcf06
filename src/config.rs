use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable overriding `token.symmetric_key`
pub const TOKEN_KEY_ENV: &str = "TOKEN_SYMMETRIC_KEY";
/// Environment variable overriding `postgres_url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; without one the server runs on the
    /// in-memory store
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub token: TokenConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Local,
    Jwt,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TokenConfig {
    #[serde(default)]
    pub kind: TokenKind,
    pub symmetric_key: String,
    #[serde(default = "default_access_token_duration")]
    pub access_token_duration_secs: u64,
    #[serde(default = "default_refresh_token_duration")]
    pub refresh_token_duration_secs: u64,
    /// Clock-skew allowance applied when checking token expiry
    #[serde(default)]
    pub leeway_secs: u64,
}

// Hand-written so the key never reaches a log line
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("kind", &self.kind)
            .field("symmetric_key", &"<redacted>")
            .field("access_token_duration_secs", &self.access_token_duration_secs)
            .field("refresh_token_duration_secs", &self.refresh_token_duration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

fn default_access_token_duration() -> u64 {
    15 * 60
}

fn default_refresh_token_duration() -> u64 {
    24 * 60 * 60
}

impl TokenConfig {
    pub fn access_token_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_duration_secs as i64)
    }

    pub fn refresh_token_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_duration_secs as i64)
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply environment overrides
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(TOKEN_KEY_ENV) {
            self.token.symmetric_key = key;
        }
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.postgres_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let key_len = self.token.symmetric_key.len();
        match self.token.kind {
            TokenKind::Local if key_len != 32 => {
                bail!("token.symmetric_key must be exactly 32 bytes, got {}", key_len)
            }
            TokenKind::Jwt if key_len < 32 => {
                bail!("token.symmetric_key must be at least 32 bytes, got {}", key_len)
            }
            _ => {}
        }
        if self.token.access_token_duration_secs == 0 || self.token.refresh_token_duration_secs == 0
        {
            bail!("token durations must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: simple_bank.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
token:
  symmetric_key: "12345678901234567890123456789012"
  access_token_duration_secs: 900
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.token.kind, TokenKind::Local);
        assert_eq!(config.token.refresh_token_duration_secs, 86_400);
        assert_eq!(config.token.leeway_secs, 0);
        assert!(config.postgres_url.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_yaml(YAML).unwrap();
        config.apply_env_overrides(|key| match key {
            TOKEN_KEY_ENV => Some("abcdefghijklmnopqrstuvwxyz012345".to_string()),
            DATABASE_URL_ENV => Some("postgresql://localhost/bank".to_string()),
            _ => None,
        });
        assert_eq!(
            config.token.symmetric_key,
            "abcdefghijklmnopqrstuvwxyz012345"
        );
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://localhost/bank")
        );
    }

    #[test]
    fn test_key_length_rules() {
        let mut config = AppConfig::from_yaml(YAML).unwrap();
        config.token.symmetric_key = "short".to_string();
        assert!(config.validate().is_err());

        config.token.kind = TokenKind::Jwt;
        config.token.symmetric_key = "x".repeat(48);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("12345678901234567890123456789012"));
        assert!(rendered.contains("<redacted>"));
    }
}

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Application configuration, loaded from `chatrelay.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Webhook endpoint that receives each chat turn. No default ships in
    /// code; an empty value is rejected at startup.
    pub webhook_url: String,
    /// Static bearer token for the webhook. The `CHATRELAY_BEARER_TOKEN`
    /// environment variable takes precedence over this field, so the token
    /// never has to live in a checked-in file.
    pub bearer_token: String,
    /// Total attempts per dispatch (first call included).
    pub max_retries: u32,
    /// Fixed sleep between attempts. No backoff growth, no jitter.
    pub retry_delay_ms: u64,
    /// Per-attempt timeout.
    pub request_timeout_secs: u64,
    pub log_dir: String,
    pub enable_dashboard: bool,
    pub dashboard_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            bearer_token: String::new(),
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
            log_dir: "logs".to_string(),
            enable_dashboard: false,
            dashboard_port: 8780,
        }
    }
}

impl AppConfig {
    /// Load configuration with the chain: `./chatrelay.toml` -> `~/chatrelay.toml` -> defaults.
    pub fn load() -> Self {
        let candidates = Self::config_paths();
        for path in &candidates {
            if let Ok(contents) = fs::read_to_string(path) {
                match toml::from_str::<AppConfig>(&contents) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("chatrelay.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("chatrelay.toml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert!(cfg.webhook_url.is_empty());
        assert!(cfg.bearer_token.is_empty());
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_delay_ms, 1000);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.log_dir, "logs");
        assert!(!cfg.enable_dashboard);
        assert_eq!(cfg.dashboard_port, 8780);
    }

    #[test]
    fn test_partial_toml_deserialize() {
        let toml_str = r#"
            webhook_url = "https://example.com/webhook/chat"
            max_retries = 5
        "#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.webhook_url, "https://example.com/webhook/chat");
        assert_eq!(cfg.max_retries, 5);
        // Other fields should be defaults
        assert_eq!(cfg.retry_delay_ms, 1000);
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn test_full_toml_deserialize() {
        let toml_str = r#"
            webhook_url = "https://example.com/webhook/chat"
            bearer_token = "from-file"
            max_retries = 2
            retry_delay_ms = 250
            request_timeout_secs = 10
            log_dir = "my_logs"
            enable_dashboard = true
            dashboard_port = 9000
        "#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.webhook_url, "https://example.com/webhook/chat");
        assert_eq!(cfg.bearer_token, "from-file");
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_delay_ms, 250);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.log_dir, "my_logs");
        assert!(cfg.enable_dashboard);
        assert_eq!(cfg.dashboard_port, 9000);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        // When no config file exists, load() returns defaults
        let cfg = AppConfig::load();
        assert_eq!(cfg.max_retries, AppConfig::default().max_retries);
    }
}

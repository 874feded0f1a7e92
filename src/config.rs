use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the tubedigest clients and BFF server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Processing backend settings
    pub api: ApiConfig,

    /// Identity provider settings
    pub auth: AuthConfig,

    /// BFF server settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the processing backend
    pub base_url: String,

    /// Timeout for backend requests (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider project identifier
    pub project_id: Option<String>,

    /// Identity provider API key
    pub api_key: Option<String>,

    /// Identity provider auth domain
    pub auth_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the BFF server listens on
    pub port: u16,

    /// Default monthly token allowance for new users
    pub default_token_limit: u64,
}

impl AuthConfig {
    /// All required identity provider settings are present. When this is
    /// false the process runs in a permanently unauthenticated state; it
    /// must not crash.
    pub fn is_configured(&self) -> bool {
        self.project_id.is_some() && self.api_key.is_some() && self.auth_domain.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_seconds: 30,
            },
            auth: AuthConfig {
                project_id: None,
                api_key: None,
                auth_domain: None,
            },
            server: ServerConfig {
                port: 3000,
                default_token_limit: 100_000,
            },
        }
    }
}

impl Config {
    /// Load configuration: first config file found, then environment
    /// overrides on top of it (or on top of the defaults).
    pub fn load() -> Result<Self> {
        let config_paths = [
            "tubedigest.toml",
            "config/tubedigest.toml",
            "/etc/tubedigest/config.toml",
        ];

        let mut config = Self::default();
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = parsed;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `TUBEDIGEST_*` environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = std::env::var("TUBEDIGEST_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("TUBEDIGEST_API_TIMEOUT_SECS") {
            self.api.timeout_seconds = timeout.parse().unwrap_or(30);
        }
        if let Ok(project_id) = std::env::var("TUBEDIGEST_AUTH_PROJECT_ID") {
            self.auth.project_id = Some(project_id);
        }
        if let Ok(api_key) = std::env::var("TUBEDIGEST_AUTH_API_KEY") {
            self.auth.api_key = Some(api_key);
        }
        if let Ok(auth_domain) = std::env::var("TUBEDIGEST_AUTH_DOMAIN") {
            self.auth.auth_domain = Some(auth_domain);
        }
        if let Ok(port) = std::env::var("TUBEDIGEST_SERVER_PORT") {
            self.server.port = port.parse().unwrap_or(3000);
        }
    }

    /// Validate configuration. Incomplete auth settings are a warning, not
    /// an error: the app degrades to an unauthenticated state.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(anyhow!("api.base_url must not be empty"));
        }
        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("api.timeout_seconds must be greater than 0"));
        }
        if !self.auth.is_configured() {
            tracing::warn!(
                "⚠️ Identity provider configuration is incomplete; authentication is disabled"
            );
        }
        Ok(())
    }
}

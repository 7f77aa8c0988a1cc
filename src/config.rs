use std::env;

use tracing::warn;

/// AutoAgents deployment the relay can talk to. Each platform key maps
/// to a fixed `agentspro.cn` host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Uat,
    Test,
    Lingda,
}

impl Platform {
    /// Resolves a platform key from configuration, `None` when unknown.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "uat" => Some(Platform::Uat),
            "test" => Some(Platform::Test),
            "lingda" => Some(Platform::Lingda),
            _ => None,
        }
    }

    /// Base URL of the platform's OpenAPI host.
    pub fn base_url(self) -> &'static str {
        match self {
            Platform::Uat => "https://uat.agentspro.cn",
            Platform::Test => "https://test.agentspro.cn",
            Platform::Lingda => "https://lingda.agentspro.cn",
        }
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Agent to address on the AutoAgents platform.
    pub agent_id: String,
    pub auth_key: String,
    pub auth_secret: String,
    /// Platform key selecting the upstream host, e.g. "uat".
    pub platform: String,
    /// Replaces the platform host entirely when set.
    pub agents_host: Option<String>,
}

impl Settings {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let settings = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            agent_id: env::var("UUID").unwrap_or_default(),
            auth_key: env::var("AUTH_KEY").unwrap_or_default(),
            auth_secret: env::var("AUTH_SECRET").unwrap_or_default(),
            platform: env::var("PLATFORM").unwrap_or_else(|_| "uat".to_string()),
            agents_host: env::var("AUTOAGENTS_HOST").ok(),
        };

        if settings.agent_id.is_empty()
            || settings.auth_key.is_empty()
            || settings.auth_secret.is_empty()
        {
            warn!("UUID / AUTH_KEY / AUTH_SECRET not fully configured; upstream calls will fail");
        }

        settings
    }
}

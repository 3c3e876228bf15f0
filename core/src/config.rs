use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Duration;

pub const DEV_BASE_URL: &str = "http://localhost:8000/api";
pub const PROD_BASE_URL: &str = "https://chemical-equipment-backend.onrender.com/api";

pub const API_URL_ENV: &str = "EQUIPVIZ_API_URL";
pub const ENVIRONMENT_ENV: &str = "EQUIPVIZ_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Development => DEV_BASE_URL,
            Environment::Production => PROD_BASE_URL,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// Klientkonfig. Alle felt har default, så en tom JSON-fil er gyldig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Overstyrer miljøets standard-URL.
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    /// Antall ekstra forsøk for GET ved nettverksfeil. 0 = av.
    pub get_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            base_url: None,
            request_timeout_secs: 10,
            upload_timeout_secs: 30,
            get_retries: 0,
            retry_backoff_ms: 250,
        }
    }
}

impl ClientConfig {
    /// Base-URL uten avsluttende `/` (stiene starter selv med `/`).
    pub fn resolved_base_url(&self) -> String {
        let raw = match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim(),
            _ => self.environment.default_base_url(),
        };
        raw.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Miljøvariabler vinner over fil. `lookup` er `std::env::var` i prod,
    /// en closure i tester.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENVIRONMENT_ENV) {
            match Environment::parse(&raw) {
                Some(env) => self.environment = env,
                None => warn!("Ignoring unknown {ENVIRONMENT_ENV}={raw:?}"),
            }
        }
        if let Some(url) = lookup(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = Some(url);
            }
        }
        self
    }

    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }
}

/// Leser inn konfig fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-konfig.
pub fn load_config(path: &Path) -> Result<ClientConfig, Box<dyn Error>> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        info!(
            "📂 Konfig lastet fra {} (base_url={})",
            path.display(),
            config.resolved_base_url()
        );
        Ok(config)
    } else {
        warn!(
            "⚠️ Fant ikke konfig på {}, bruker default ({})",
            path.display(),
            DEV_BASE_URL
        );
        Ok(ClientConfig::default())
    }
}

/// Lagrer konfig til disk som JSON (pretty-print). Credentials hører ikke hjemme her.
pub fn save_config(config: &ClientConfig, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!("✅ Konfig lagret til {}", path.display());
    Ok(())
}

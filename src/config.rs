use std::time::Duration;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use url::Url;

const LOCAL_ENV: &str = "local";
const ENV_PREFIX: &str = "FAAS_CONSOLE_";
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;
// Creation blocks on the backend until the function answers its own health
// endpoint, so it needs a much longer budget than a probe.
const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 300;

/// Health probe settings.
#[serde_inline_default]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Upper bound for a single probe. A probe that exceeds it is reported
    /// as unhealthy.
    #[serde_inline_default(Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS))]
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }
}

mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(seconds))
    }
}

/// Configuration for the console.
#[serde_inline_default]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Environment name (e.g., "local", "staging", "production").
    #[serde_inline_default(LOCAL_ENV.to_string())]
    pub env: String,
    /// Base URL of the FaaS backend, including the scheme.
    #[serde_inline_default("http://localhost:8000".to_string())]
    pub api_url: String,
    /// Path of the functions collection on the backend.
    #[serde_inline_default("/api/functions".to_string())]
    pub functions_path: String,
    /// Upper bound for a create request, in seconds.
    #[serde_inline_default(Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS))]
    #[serde(with = "duration_serde")]
    pub create_timeout: Duration,
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            env: LOCAL_ENV.to_string(),
            api_url: "http://localhost:8000".to_string(),
            functions_path: "/api/functions".to_string(),
            create_timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
            health_check: HealthCheckConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_path(path: &str) -> Result<ConsoleConfig> {
        let config_str = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&config_str)
    }

    fn from_yaml_str(config_str: &str) -> Result<ConsoleConfig> {
        let config: ConsoleConfig = Figment::new()
            .merge(Yaml::string(config_str))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `FAAS_CONSOLE_*` environment variables.
    pub fn from_env() -> Result<ConsoleConfig> {
        let config: ConsoleConfig = Figment::new()
            .merge(Serialized::defaults(ConsoleConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "api_url must include a scheme (http:// or https://), got: {}",
                self.api_url
            ));
        }
        Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("invalid api_url {}: {}", self.api_url, e))?;

        if !self.functions_path.starts_with('/') {
            return Err(anyhow::anyhow!(
                "functions_path must start with '/', got: {}",
                self.functions_path
            ));
        }
        if self.create_timeout.is_zero() {
            return Err(anyhow::anyhow!("create_timeout must be greater than zero"));
        }
        if self.health_check.timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "health_check.timeout must be greater than zero"
            ));
        }
        Ok(())
    }

    pub fn structured_logging(&self) -> bool {
        self.env != LOCAL_ENV
    }

    /// Absolute URL of the functions collection.
    pub fn functions_url(&self) -> Result<Url> {
        let base = Url::parse(&self.api_url)?;
        let path = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            self.functions_path.trim_matches('/')
        );
        let mut url = base;
        url.set_path(&path);
        Ok(url)
    }
}

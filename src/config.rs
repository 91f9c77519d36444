use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for barangay-verify
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerifyConfig {
    /// Backend connection settings
    pub api: ApiConfig,
    /// Status polling settings
    pub polling: PollingConfig,
    /// Registration code settings
    pub registration: RegistrationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the `/api` prefix
    pub base_url: String,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
    /// Origin serving uploaded documents under `/storage`
    pub storage_url: String,
    pub request_timeout_secs: u64,
    /// Client-side request ceiling
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            storage_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
            requests_per_second: 2,
            burst: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Fixed interval between status polls
    pub interval_secs: u64,
    /// Give up on the loading placeholder after this long
    pub loading_timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            loading_timeout_secs: 3,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_secs(self.loading_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    /// Lifetime of an emailed verification code
    pub code_ttl_secs: u64,
    /// Number of digits in a verification code
    pub code_length: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: 300, // 5 minutes
            code_length: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of compact text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl VerifyConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (barangay-verify.toml, .barangay-verify-rc)
    /// 3. Environment variables (prefixed with BARANGAY_VERIFY__)
    pub fn load() -> Result<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&VerifyConfig::default())?);

        if Path::new("barangay-verify.toml").exists() {
            builder = builder.add_source(File::with_name("barangay-verify"));
        }

        if Path::new(".barangay-verify-rc").exists() {
            builder = builder.add_source(
                File::with_name(".barangay-verify-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("BARANGAY_VERIFY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut verify_config: VerifyConfig = builder
            .build()?
            .try_deserialize()
            .context("Invalid barangay-verify configuration")?;

        if verify_config.api.token.is_none() {
            if let Ok(token) = std::env::var("BARANGAY_API_TOKEN") {
                verify_config.api.token = Some(token);
            }
        }

        Ok(verify_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<VerifyConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = VerifyConfig::load_env_file();
        VerifyConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static VerifyConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<&'static VerifyConfig> {
    let config = config()?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");
    Ok(config)
}

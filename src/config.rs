use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the BaseBase client
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BasebaseConfig {
    /// Platform branding and public URLs
    pub app: AppConfig,
    /// Platform API settings
    pub api: ApiConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Session persistence settings
    pub session: SessionConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Platform name displayed in CLI output
    pub name: String,
    /// Public site URL
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the platform API
    pub base_url: String,
    /// Base URL of the hosted editor (success links point here)
    pub editor_base_url: String,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Project ID presented during code verification
    pub default_project_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the persisted session file
    pub state_file_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is not set
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable output
    pub json_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "BaseBase".to_string(),
            url: "https://basebase.ai".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.basebase.ai".to_string(),
            editor_base_url: "https://editor.basebase.ai".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_project_id: "basebase_platform".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_file_path: ".basebase/session.json".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl BasebaseConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (basebase.toml)
    /// 3. Environment variables (prefixed with BASEBASE__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("basebase.toml").exists() {
            builder = builder.add_source(File::with_name("basebase"));
        }

        builder = builder.add_source(
            Environment::with_prefix("BASEBASE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let basebase_config: BasebaseConfig = config.try_deserialize()?;

        Ok(basebase_config)
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
static CONFIG: std::sync::LazyLock<Result<BasebaseConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = BasebaseConfig::load_env_file();
        BasebaseConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static BasebaseConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::debug!("Configuration loaded successfully");
    Ok(())
}

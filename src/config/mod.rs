use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub crm: CrmConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("CRM_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let crm = CrmConfig::new(base_url)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            crm,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for the outbound CRM connection.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    base_url: String,
}

impl CrmConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let trimmed = base_url.into().trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        Ok(Self { base_url: trimmed })
    }

    /// Base URL without a trailing slash, ready to join endpoint paths onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyBaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyBaseUrl => write!(f, "CRM_BASE_URL must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Shared key for service-to-service calls (message dispatch)
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend: "memory" (default) or "postgres"
    #[serde(default = "default_database_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

/// OneSignal account settings.
///
/// Credentials may legitimately be empty; see [`ProviderConfig::is_configured`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub rest_key: String,
    /// App name identifier in OneSignal
    #[serde(default)]
    pub app_name: String,
    /// Mobile app unique identifier, e.g. `com.example.mobile`
    #[serde(default)]
    pub mobile_app_name: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_large_icon")]
    pub large_icon: String,
    /// Opaque key/value passthrough for the payload `data` field
    #[serde(default)]
    pub data: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// True when both the app id and the REST key are present.
    pub fn is_configured(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.rest_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Retries after the first attempt for transient provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Site-wide switch that turns every outbound notification into a no-op
    #[serde(default)]
    pub suppress_all: bool,
    /// Processor name looked up in notification preferences
    #[serde(default = "default_processor_name")]
    pub processor_name: String,
    /// Site-forced preferences, `message_provider_*` name to processor list
    #[serde(default)]
    pub forced_preferences: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Device platforms able to receive push notifications
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
}

impl PushConfig {
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform.trim()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_database_backend() -> String {
    "memory".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_idle_timeout() -> u32 {
    600
}

fn default_api_url() -> String {
    "https://onesignal.com/api/v1/notifications".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_large_icon() -> String {
    "ic_launcher_round.png".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff() -> u64 {
    200
}

fn default_max_backoff() -> u64 {
    5_000
}

fn default_processor_name() -> String {
    "onesignal".to_string()
}

fn default_platforms() -> Vec<String> {
    vec!["ios".to_string()]
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "onesignal-bridge".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("database.backend", "memory")?
            .set_default("provider.api_url", default_api_url())?
            .set_default("provider.request_timeout_seconds", 10)?
            .set_default("delivery.max_retries", 2)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, JWT__SECRET, PROVIDER__APP_ID, PROVIDER__REST_KEY, ...
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("push.platforms"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Settings that leave the service running but degraded or exposed.
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if !self.provider.is_configured() {
            warnings.push("Push provider credentials missing, messages will be skipped until configured");
        }
        if self.api.key.is_none() {
            warnings.push("No service API key configured, message submission accepts unauthenticated requests");
        }
        warnings
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_database_backend(),
            url: String::new(),
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            rest_key: String::new(),
            app_name: String::new(),
            mobile_app_name: String::new(),
            api_url: default_api_url(),
            request_timeout_seconds: default_request_timeout(),
            large_icon: default_large_icon(),
            data: None,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            suppress_all: false,
            processor_name: default_processor_name(),
            forced_preferences: HashMap::new(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            platforms: default_platforms(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

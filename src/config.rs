use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_WAREHOUSE: &str = "1050";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PRODUCTION_ITEM_CATEGORY: &str = "ZPRD";

/// Base URLs of the remote document services and the print collaborators
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Handling-unit service (OData V4)
    #[validate(url)]
    pub handling_unit_url: String,

    /// Inbound-delivery service, also serves document flow (OData V2)
    #[validate(url)]
    pub inbound_delivery_url: String,

    /// Purchase-order service (OData V4)
    #[validate(url)]
    pub purchase_order_url: String,

    /// Material-document service (OData V2)
    #[validate(url)]
    pub material_document_url: String,

    /// Product master, plant view (OData V2)
    #[validate(url)]
    pub product_master_url: String,

    /// Label print gateway
    #[validate(url)]
    pub print_gateway_url: String,

    /// Audit store; audit writes are skipped when absent
    #[serde(default)]
    #[validate(url)]
    pub audit_url: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            handling_unit_url: "http://localhost:4004/odata/v4/handlingunit".to_string(),
            inbound_delivery_url: "http://localhost:4004/sap/opu/odata/sap/API_INBOUND_DELIVERY_SRV"
                .to_string(),
            purchase_order_url: "http://localhost:4004/odata/v4/purchaseorder".to_string(),
            material_document_url:
                "http://localhost:4004/sap/opu/odata/sap/API_MATERIAL_DOCUMENT_SRV".to_string(),
            product_master_url: "http://localhost:4004/sap/opu/odata/sap/API_PRODUCT_SRV"
                .to_string(),
            print_gateway_url: "http://localhost:4005".to_string(),
            audit_url: None,
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    pub environment: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Warehouse the scanner is operating in
    #[serde(default = "default_warehouse")]
    #[validate(length(min = 1))]
    pub warehouse: String,

    /// Timeout applied to every remote call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,

    /// Upper bound for one HTTP request to this service, in seconds
    #[serde(default = "default_http_timeout_secs")]
    #[validate(range(min = 1, max = 3600))]
    pub http_timeout_secs: u64,

    /// Inbound-delivery item category that marks production-order receipts
    #[serde(default = "default_production_item_category")]
    #[validate(length(min = 1))]
    pub production_item_category: String,

    /// Optional JSON file replacing the built-in country reference list
    #[serde(default)]
    pub country_list_path: Option<String>,

    #[serde(default)]
    #[validate]
    pub endpoints: EndpointConfig,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the endpoints
    pub fn new(environment: String, endpoints: EndpointConfig) -> Self {
        Self {
            environment,
            host: "0.0.0.0".to_string(),
            port: default_port(),
            log_level: default_log_level(),
            log_json: false,
            warehouse: default_warehouse(),
            request_timeout_secs: default_request_timeout_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            production_item_category: default_production_item_category(),
            country_list_path: None,
            endpoints,
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// A print batch makes one gateway call per unit, so this is usually
    /// well above [`Self::request_timeout`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_warehouse() -> String {
    DEFAULT_WAREHOUSE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_production_item_category() -> String {
    DEFAULT_PRODUCTION_ITEM_CATEGORY.to_string()
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set and non-empty.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("inbound_label={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] but reading the TOML profiles from `config_dir`.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let defaults = EndpointConfig::default();
    let config = Config::builder()
        .set_default("environment", DEFAULT_ENV)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("endpoints.handling_unit_url", defaults.handling_unit_url)?
        .set_default("endpoints.inbound_delivery_url", defaults.inbound_delivery_url)?
        .set_default("endpoints.purchase_order_url", defaults.purchase_order_url)?
        .set_default(
            "endpoints.material_document_url",
            defaults.material_document_url,
        )?
        .set_default("endpoints.product_master_url", defaults.product_master_url)?
        .set_default("endpoints.print_gateway_url", defaults.print_gateway_url)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

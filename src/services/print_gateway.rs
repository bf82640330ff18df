use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::AppConfig;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{AuditRecord, PrintPayload};

/// Path of the label order endpoint below the gateway base URL
pub const PRINT_ORDER_PATH: &str = "/http/Bartender/Order";

/// Accepts one label per call
#[async_trait]
pub trait PrintGateway: Send + Sync {
    async fn submit(&self, payload: &PrintPayload) -> ServiceResult<()>;
}

/// Receives a record for every printed label
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> ServiceResult<()>;
}

fn http_client(timeout: Duration) -> ServiceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::ConfigError(format!("HTTP client: {}", e)))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Debug, Clone)]
pub struct HttpPrintGateway {
    client: reqwest::Client,
    order_url: String,
}

impl HttpPrintGateway {
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            order_url: join_url(base_url, PRINT_ORDER_PATH),
        })
    }

    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        Self::new(&config.endpoints.print_gateway_url, config.request_timeout())
    }
}

#[async_trait]
impl PrintGateway for HttpPrintGateway {
    #[instrument(skip(self, payload), fields(hu = %payload.order_hu.hu, sequence = %payload.order_hu.r#box))]
    async fn submit(&self, payload: &PrintPayload) -> ServiceResult<()> {
        let response = self
            .client
            .post(&self.order_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ServiceError::PrintGatewayError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Print gateway rejected label: {}", text);
            let message = if text.trim().is_empty() {
                format!("gateway returned {}", status)
            } else {
                text
            };
            return Err(ServiceError::PrintGatewayError(message));
        }
        debug!("Label accepted");
        Ok(())
    }
}

/// Posts audit rows as JSON to a single collection URL
#[derive(Debug, Clone)]
pub struct HttpAuditStore {
    client: reqwest::Client,
    url: String,
}

impl HttpAuditStore {
    pub fn new(url: &str, timeout: Duration) -> ServiceResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
        })
    }

    /// `None` when no audit URL is configured
    pub fn from_config(config: &AppConfig) -> ServiceResult<Option<Self>> {
        config
            .endpoints
            .audit_url
            .as_deref()
            .map(|url| Self::new(url, config.request_timeout()))
            .transpose()
    }
}

#[async_trait]
impl AuditStore for HttpAuditStore {
    async fn record(&self, record: &AuditRecord) -> ServiceResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| ServiceError::transport(format!("audit write: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::transport(format!(
                "audit write returned {}",
                status
            )));
        }
        Ok(())
    }
}

//! Inbound label service
//!
//! Resolves a scanned handling unit or inbound delivery into print-ready
//! label data and dispatches one label per handling unit to the print
//! gateway.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::AppConfig;
use crate::errors::ServiceResult;
use crate::repositories::{DocumentRepository, ODataClient};
use crate::services::{
    AuditStore, BusyIndicator, CountryRegistry, HttpAuditStore, HttpPrintGateway,
    LabelPrintService, PrintGateway, ResolutionPipeline, ScanSession,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: ResolutionPipeline,
    pub printer: LabelPrintService,
    pub countries: Arc<CountryRegistry>,
    pub busy: BusyIndicator,
}

impl AppState {
    /// Wires the HTTP-backed collaborators named in `config`.
    pub fn from_config(config: AppConfig) -> ServiceResult<Self> {
        let repository: Arc<dyn DocumentRepository> = Arc::new(ODataClient::from_config(&config)?);
        let gateway: Arc<dyn PrintGateway> = Arc::new(HttpPrintGateway::from_config(&config)?);
        let audit = HttpAuditStore::from_config(&config)?
            .map(|store| Arc::new(store) as Arc<dyn AuditStore>);
        let countries = CountryRegistry::load(config.country_list_path.as_deref().map(Path::new))?;
        Ok(Self::new(config, repository, gateway, audit, countries))
    }

    pub fn new(
        config: AppConfig,
        repository: Arc<dyn DocumentRepository>,
        gateway: Arc<dyn PrintGateway>,
        audit: Option<Arc<dyn AuditStore>>,
        countries: CountryRegistry,
    ) -> Self {
        let pipeline = ResolutionPipeline::new(repository, config.production_item_category.clone());
        Self {
            config: Arc::new(config),
            pipeline,
            printer: LabelPrintService::new(gateway, audit),
            countries: Arc::new(countries),
            busy: BusyIndicator::new(),
        }
    }

    /// A scanner session sharing this state's collaborators
    pub fn session(&self) -> ScanSession {
        ScanSession::new(
            self.pipeline.clone(),
            self.printer.clone(),
            self.countries.clone(),
            self.busy.clone(),
            self.config.warehouse.clone(),
        )
    }
}

/// Envelope for successful responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Handler result: JSON envelope or a `ServiceError` response
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

/// Version 1 routes. Printing is left outside the timeout so a batch is
/// never dropped halfway through dispatch.
pub fn api_v1_routes(timeout: Duration) -> Router<AppState> {
    Router::new()
        .route("/labels/resolve", post(handlers::labels::resolve_labels))
        .route("/countries/:code", get(handlers::countries::validate_country))
        .layer(TimeoutLayer::new(timeout))
        .route("/labels/print", post(handlers::labels::print_labels))
}

/// Complete application router with tracing, timeout and CORS layers.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.http_timeout();
    let cors = if state.config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes(timeout))
        .layer(axum::middleware::from_fn(logging::logging_middleware))
        .layer(logging::http_trace_layer())
        .layer(cors)
        .with_state(state)
}

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::{CountryOfOriginField, OperatorEntries, ResolvedLabelState, ScanInput},
    services::{PipelineStage, PrintOutcome, StageTracker},
    ApiResponse, ApiResult, AppState,
};

/// `{"handling_unit": ".."}` or `{"inbound_delivery": ".."}`, optionally
/// with a warehouse overriding the configured one.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveRequest {
    #[serde(flatten)]
    pub scan: ScanInput,
    #[validate(length(min = 1, max = 10, message = "Warehouse must be 1-10 characters"))]
    pub warehouse: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub state: ResolvedLabelState,
    /// Entries to start from; country of origin pre-filled from master data
    pub entries: OperatorEntries,
    pub stages: Vec<PipelineStage>,
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub state: ResolvedLabelState,
    #[serde(default)]
    pub entries: OperatorEntries,
}

pub async fn resolve_labels(
    State(state): State<AppState>,
    Json(payload): Json<ResolveRequest>,
) -> ApiResult<ResolveResponse> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let warehouse = payload
        .warehouse
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .unwrap_or(&state.config.warehouse)
        .to_string();
    let _busy = state.busy.acquire();
    let mut tracker = StageTracker::new();
    let resolved = state
        .pipeline
        .run_tracked(payload.scan, &warehouse, &mut tracker)
        .await?;

    let entries = OperatorEntries {
        country_of_origin: resolved
            .country_of_origin
            .as_deref()
            .map(CountryOfOriginField::prefilled)
            .unwrap_or_default(),
        ..Default::default()
    };

    Ok(Json(ApiResponse::success(ResolveResponse {
        state: resolved,
        entries,
        stages: tracker.history().to_vec(),
    })))
}

/// Prints a state previously returned by `resolve`. The country of origin is
/// validated again here; the client's flag is not trusted.
pub async fn print_labels(
    State(state): State<AppState>,
    Json(payload): Json<PrintRequest>,
) -> ApiResult<PrintOutcome> {
    let PrintRequest {
        state: resolved,
        mut entries,
    } = payload;

    let typed = entries.country_of_origin.value.clone();
    state.countries.edit(&mut entries.country_of_origin, &typed);

    let _busy = state.busy.acquire();
    let outcome = state.printer.print(&resolved, &entries).await?;
    info!(
        ibd = %resolved.inbound_delivery,
        labels = outcome.printed.len(),
        "Print request completed"
    );
    Ok(Json(
        ApiResponse::success(outcome).with_message("Label printed successfully."),
    ))
}

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::{services::CountryValidation, ApiResponse, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct CountryCheck {
    pub input: String,
    pub valid: bool,
    pub result: CountryValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Runs the country-of-origin validator on `code`.
pub async fn validate_country(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<CountryCheck> {
    let result = state.countries.validate(&code);
    Ok(Json(ApiResponse::success(CountryCheck {
        input: code,
        valid: result.is_valid(),
        message: result.message(),
        result,
    })))
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::CountryOfOriginField;

const EMBEDDED_COUNTRIES: &str = include_str!("../../data/countries.json");

const MSG_ENTER_TWO_LETTERS: &str = "enter 2-letter code";
const MSG_INVALID_CODE: &str = "invalid country code";

/// Entry of the country reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// Outcome of validating the country-of-origin buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CountryValidation {
    /// Nothing typed yet; neutral, no message
    Empty,
    /// Wrong length
    Incomplete,
    /// Two letters, not in the reference list
    Invalid,
    Valid { code: String, name: String },
}

impl CountryValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Text shown next to the field, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Empty | Self::Valid { .. } => None,
            Self::Incomplete => Some(MSG_ENTER_TWO_LETTERS),
            Self::Invalid => Some(MSG_INVALID_CODE),
        }
    }
}

/// Static reference list of ISO 3166 alpha-2 codes, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    by_code: HashMap<String, String>,
}

impl CountryRegistry {
    /// Registry built from the list compiled into the binary
    pub fn embedded() -> ServiceResult<Self> {
        Self::from_json(EMBEDDED_COUNTRIES)
    }

    /// Uses `path` when given, the embedded list otherwise.
    pub fn load(path: Option<&Path>) -> ServiceResult<Self> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::ConfigError(format!(
                "Cannot read country list {}: {}",
                path.display(),
                e
            ))
        })?;
        let registry = Self::from_json(&raw)?;
        info!(path = %path.display(), countries = registry.len(), "Loaded country list");
        Ok(registry)
    }

    pub fn from_json(raw: &str) -> ServiceResult<Self> {
        let countries: Vec<Country> = serde_json::from_str(raw)?;
        Ok(Self::from_countries(countries))
    }

    pub fn from_countries(countries: impl IntoIterator<Item = Country>) -> Self {
        let by_code = countries
            .into_iter()
            .map(|c| (c.code.trim().to_uppercase(), c.name))
            .collect();
        Self { by_code }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.by_code.get(&code.trim().to_uppercase()).map(String::as_str)
    }

    /// Validates the raw buffer. Matching is case-insensitive.
    pub fn validate(&self, input: &str) -> CountryValidation {
        let code = input.trim().to_uppercase();
        match code.chars().count() {
            0 => CountryValidation::Empty,
            2 => match self.by_code.get(&code) {
                Some(name) => CountryValidation::Valid {
                    code,
                    name: name.clone(),
                },
                None => CountryValidation::Invalid,
            },
            _ => CountryValidation::Incomplete,
        }
    }

    /// Applies an operator edit to the field.
    ///
    /// The flag is cleared first and only set again once the new value
    /// validates.
    pub fn edit(&self, field: &mut CountryOfOriginField, input: &str) -> CountryValidation {
        field.valid = false;
        field.prefilled = false;
        field.value = input.trim().to_uppercase();

        let result = self.validate(&field.value);
        field.valid = result.is_valid();
        debug!(value = %field.value, valid = field.valid, "Country of origin edited");
        result
    }
}

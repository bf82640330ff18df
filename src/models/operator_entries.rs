use serde::{Deserialize, Serialize};

/// Country-of-origin input: the text buffer and its validity are kept apart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOfOriginField {
    pub value: String,
    #[serde(default)]
    pub valid: bool,
    /// Set while the value still is the one taken from master data
    #[serde(skip)]
    pub prefilled: bool,
}

impl CountryOfOriginField {
    /// Value taken from master data; trusted as valid.
    pub fn prefilled(code: &str) -> Self {
        Self {
            value: code.trim().to_uppercase(),
            valid: true,
            prefilled: true,
        }
    }

    /// Whether a new scan may overwrite the field: empty, or untouched since
    /// it was pre-filled.
    pub fn is_replaceable(&self) -> bool {
        self.prefilled || self.value.trim().is_empty()
    }

    pub fn is_present_and_valid(&self) -> bool {
        !self.value.trim().is_empty() && self.valid
    }
}

/// Fields typed in by the operator at the scanner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorEntries {
    #[serde(default)]
    pub country_of_origin: CountryOfOriginField,
    /// Lot / EI number
    #[serde(default)]
    pub lot: String,
    #[serde(default)]
    pub label_format: String,
    #[serde(default)]
    pub printer: String,
}

impl OperatorEntries {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

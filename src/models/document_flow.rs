use serde::{Deserialize, Serialize};

use super::odata;

/// Category of the document on the subsequent side of a flow edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCategory {
    /// `R`: goods movement, i.e. the material document of a goods receipt
    GoodsReceipt,
    /// `H`: handling unit
    HandlingUnit,
    Other(String),
}

impl FlowCategory {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "R" => Self::GoodsReceipt,
            "H" => Self::HandlingUnit,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One edge of the delivery's document flow (`A_InbDeliveryDocFlow`, OData V2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFlowEntry {
    #[serde(rename = "PrecedingDocument", default)]
    pub preceding_document: String,
    #[serde(rename = "PrecedingDocumentItem", default)]
    pub preceding_document_item: String,
    #[serde(rename = "SubsequentDocumentCategory", default)]
    pub subsequent_document_category: String,
    #[serde(rename = "SubsequentDocument", default)]
    pub subsequent_document: String,
    /// Raw item number; may carry six digits where four are meant
    #[serde(
        rename = "SubsequentDocumentItem",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub subsequent_document_item: Option<String>,
    #[serde(
        rename = "SubsequentDocumentYear",
        default,
        deserialize_with = "odata::string_or_number"
    )]
    pub subsequent_document_year: Option<String>,
}

impl DocumentFlowEntry {
    pub fn category(&self) -> FlowCategory {
        FlowCategory::from_code(&self.subsequent_document_category)
    }

    pub fn is_goods_receipt(&self) -> bool {
        self.category() == FlowCategory::GoodsReceipt
    }

    /// Numeric value of the subsequent document key, if it is numeric.
    pub fn subsequent_document_number(&self) -> Option<u64> {
        self.subsequent_document.trim().parse().ok()
    }
}

/// Fully qualified key of a goods-receipt material document item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceiptKey {
    pub material_document: String,
    pub fiscal_year: String,
    pub item: String,
}

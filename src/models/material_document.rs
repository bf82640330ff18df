use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::odata;

/// `A_MaterialDocumentHeader` (OData V2); only the creation date is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDocumentHeader {
    #[serde(rename = "MaterialDocument")]
    pub material_document: String,
    #[serde(rename = "MaterialDocumentYear", default)]
    pub material_document_year: String,
    #[serde(rename = "CreationDate", default, deserialize_with = "odata::opt_date")]
    pub creation_date: Option<NaiveDate>,
}

/// `A_MaterialDocumentItem` (OData V2); only the base quantity is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDocumentItem {
    #[serde(rename = "MaterialDocument")]
    pub material_document: String,
    #[serde(rename = "MaterialDocumentYear", default)]
    pub material_document_year: String,
    #[serde(rename = "MaterialDocumentItem", default)]
    pub material_document_item: String,
    #[serde(
        rename = "QuantityInBaseUnit",
        default,
        deserialize_with = "odata::string_or_number"
    )]
    pub quantity_in_base_unit: Option<String>,
    #[serde(rename = "MaterialBaseUnit", default)]
    pub base_unit: String,
}

/// Goods receipt as printed on the label: header date plus item quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDocument {
    pub document_number: String,
    pub fiscal_year: String,
    pub item: String,
    pub creation_date: Option<NaiveDate>,
    pub quantity_in_base_unit: Option<String>,
    #[serde(default)]
    pub base_unit: String,
}

impl MaterialDocument {
    pub fn combine(header: MaterialDocumentHeader, item: MaterialDocumentItem) -> Self {
        Self {
            document_number: item.material_document,
            fiscal_year: header.material_document_year,
            item: item.material_document_item,
            creation_date: header.creation_date,
            quantity_in_base_unit: item.quantity_in_base_unit,
            base_unit: item.base_unit,
        }
    }

    pub fn has_document_number(&self) -> bool {
        !self.document_number.trim().is_empty()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::odata;

/// Handling unit as served by the warehouse HU service (OData V4)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingUnit {
    /// Scanned barcode
    #[serde(rename = "HandlingUnitExternalID")]
    pub external_id: String,
    #[serde(
        rename = "HandlingUnitInternalID",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub internal_id: Option<String>,
    #[serde(rename = "Warehouse", default)]
    pub warehouse: String,
    #[serde(rename = "PackagingMaterial", default)]
    pub packaging_material: String,
    #[serde(rename = "StorageLocation", default)]
    pub storage_location: String,
    #[serde(rename = "StorageBin", default)]
    pub storage_bin: String,
    #[serde(rename = "StorageType", default)]
    pub storage_type: String,
    /// Inbound delivery the unit was packed against
    #[serde(
        rename = "HandlingUnitReferenceDocument",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub reference_document: Option<String>,
    #[serde(
        rename = "CreationDateTime",
        default,
        deserialize_with = "odata::opt_datetime"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_HandlingUnitItem", default)]
    pub items: Vec<HandlingUnitItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingUnitItem {
    #[serde(rename = "Material", default)]
    pub material: String,
    #[serde(
        rename = "HandlingUnitQuantity",
        default,
        deserialize_with = "odata::string_or_number"
    )]
    pub quantity: Option<String>,
    #[serde(rename = "HandlingUnitQuantityUnit", default)]
    pub unit: String,
    #[serde(
        rename = "MaterialDescription",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub description: Option<String>,
}

impl HandlingUnit {
    /// The item whose material and quantity go on the label.
    pub fn primary_item(&self) -> Option<&HandlingUnitItem> {
        self.items.first()
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::odata;

/// Line of an inbound delivery (`A_InbDeliveryItem`, OData V2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundDeliveryItem {
    #[serde(rename = "DeliveryDocument")]
    pub delivery_document: String,
    #[serde(rename = "DeliveryDocumentItem")]
    pub delivery_document_item: String,
    #[serde(rename = "Material", default)]
    pub material: String,
    #[serde(
        rename = "DeliveryDocumentItemText",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub item_text: Option<String>,
    #[serde(rename = "Plant", default)]
    pub plant: String,
    #[serde(rename = "StorageLocation", default)]
    pub storage_location: String,
    #[serde(rename = "Batch", default)]
    pub batch: String,
    #[serde(
        rename = "ShelfLifeExpirationDate",
        default,
        deserialize_with = "odata::opt_date"
    )]
    pub expiration_date: Option<NaiveDate>,
    #[serde(rename = "ManufactureDate", default, deserialize_with = "odata::opt_date")]
    pub manufacture_date: Option<NaiveDate>,
    /// Distinguishes purchase-order receipts from production receipts
    #[serde(rename = "DeliveryDocumentItemCategory", default)]
    pub item_category: String,
    /// Purchase order the line was created from, when there is one
    #[serde(
        rename = "ReferenceSDDocument",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub reference_sd_document: Option<String>,
    #[serde(
        rename = "ReferenceSDDocumentItem",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub reference_sd_document_item: Option<String>,
    #[serde(rename = "OrderID", default, deserialize_with = "odata::empty_as_none")]
    pub order_id: Option<String>,
    #[serde(rename = "OrderItem", default, deserialize_with = "odata::empty_as_none")]
    pub order_item: Option<String>,
}

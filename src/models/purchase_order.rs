use serde::{Deserialize, Serialize};

use super::odata;

/// Purchase order header with its expanded items (OData V4)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(rename = "PurchaseOrder")]
    pub purchase_order: String,
    #[serde(rename = "Supplier", default)]
    pub supplier: String,
    #[serde(rename = "_PurchaseOrderItem", default)]
    pub items: Vec<PurchaseOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    #[serde(rename = "PurchaseOrderItem", default)]
    pub purchase_order_item: String,
    #[serde(rename = "PurchaseOrderItemText", default)]
    pub item_text: String,
    #[serde(rename = "ManufacturerMaterial", default)]
    pub manufacturer_material: String,
    #[serde(rename = "StockType", default)]
    pub stock_type: String,
    #[serde(
        rename = "PurchaseOrderCategory",
        default,
        deserialize_with = "odata::empty_as_none"
    )]
    pub purchase_order_category: Option<String>,
}

impl PurchaseOrderItem {
    /// `"X"` when the item posts to quality-inspection stock, empty otherwise.
    pub fn stock_category_flag(&self) -> &'static str {
        if self.stock_type == "X" {
            "X"
        } else {
            ""
        }
    }

    /// `"K"` for consignment items, empty otherwise.
    pub fn special_stock_flag(&self) -> &'static str {
        if self.purchase_order_category.as_deref() == Some("K") {
            "K"
        } else {
            ""
        }
    }
}

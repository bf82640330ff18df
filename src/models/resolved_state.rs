use serde::{Deserialize, Serialize};

use super::{
    document_flow::GoodsReceiptKey, handling_unit::HandlingUnit,
    inbound_delivery::InboundDeliveryItem, material_document::MaterialDocument,
    purchase_order::{PurchaseOrder, PurchaseOrderItem},
};
use crate::errors::ServiceError;

/// What the operator scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanInput {
    /// External id of a handling unit; its reference document names the delivery
    HandlingUnit(String),
    /// Inbound delivery number, entered directly
    InboundDelivery(String),
}

impl ScanInput {
    pub fn identifier(&self) -> &str {
        match self {
            Self::HandlingUnit(id) | Self::InboundDelivery(id) => id,
        }
    }
}

/// Production order recorded from the delivery line, no further lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrderRef {
    pub order_id: String,
    pub order_item: String,
}

/// Source document behind the delivery line, decided once at ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderReference {
    PurchaseOrderBacked {
        purchase_order: PurchaseOrder,
        item: PurchaseOrderItem,
    },
    ProductionOrderBacked(ProductionOrderRef),
}

/// Everything the pipeline resolved for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLabelState {
    pub scan: ScanInput,
    pub warehouse: String,
    /// Present for the HU-first entry only
    pub scanned_unit: Option<HandlingUnit>,
    pub inbound_delivery: String,
    /// Representative delivery line (first-item policy)
    pub delivery_item: InboundDeliveryItem,
    pub order: OrderReference,
    pub goods_receipt: GoodsReceiptKey,
    pub material_document: MaterialDocument,
    /// Country of origin from the product-plant master, if maintained
    pub country_of_origin: Option<String>,
    /// Latest cohort of units packed against the delivery; one label each
    pub handling_units: Vec<HandlingUnit>,
}

impl ResolvedLabelState {
    pub fn is_production_order(&self) -> bool {
        matches!(self.order, OrderReference::ProductionOrderBacked(_))
    }

    pub fn purchase_order(&self) -> Option<(&PurchaseOrder, &PurchaseOrderItem)> {
        match &self.order {
            OrderReference::PurchaseOrderBacked {
                purchase_order,
                item,
            } => Some((purchase_order, item)),
            OrderReference::ProductionOrderBacked(_) => None,
        }
    }

    pub fn production_order(&self) -> Option<&ProductionOrderRef> {
        match &self.order {
            OrderReference::ProductionOrderBacked(order) => Some(order),
            OrderReference::PurchaseOrderBacked { .. } => None,
        }
    }
}

/// Accumulator threaded through the pipeline stages.
///
/// Each stage consumes the builder and hands back a new one; nothing is
/// shared between runs.
#[derive(Debug, Clone)]
pub struct LabelStateBuilder {
    scan: ScanInput,
    warehouse: String,
    scanned_unit: Option<HandlingUnit>,
    inbound_delivery: Option<String>,
    delivery_item: Option<InboundDeliveryItem>,
    order: Option<OrderReference>,
    goods_receipt: Option<GoodsReceiptKey>,
    material_document: Option<MaterialDocument>,
    country_of_origin: Option<String>,
    handling_units: Vec<HandlingUnit>,
}

impl LabelStateBuilder {
    pub fn new(scan: ScanInput, warehouse: impl Into<String>) -> Self {
        let inbound_delivery = match &scan {
            ScanInput::InboundDelivery(ibd) => Some(ibd.clone()),
            ScanInput::HandlingUnit(_) => None,
        };
        Self {
            scan,
            warehouse: warehouse.into(),
            scanned_unit: None,
            inbound_delivery,
            delivery_item: None,
            order: None,
            goods_receipt: None,
            material_document: None,
            country_of_origin: None,
            handling_units: Vec::new(),
        }
    }

    pub fn scan(&self) -> &ScanInput {
        &self.scan
    }

    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    pub fn inbound_delivery(&self) -> Option<&str> {
        self.inbound_delivery.as_deref()
    }

    pub fn delivery_item(&self) -> Option<&InboundDeliveryItem> {
        self.delivery_item.as_ref()
    }

    pub fn with_scanned_unit(self, unit: HandlingUnit, inbound_delivery: String) -> Self {
        Self {
            scanned_unit: Some(unit),
            inbound_delivery: Some(inbound_delivery),
            ..self
        }
    }

    pub fn with_delivery_item(self, item: InboundDeliveryItem) -> Self {
        Self {
            delivery_item: Some(item),
            ..self
        }
    }

    pub fn with_order(self, order: OrderReference) -> Self {
        Self {
            order: Some(order),
            ..self
        }
    }

    pub fn with_goods_receipt(self, key: GoodsReceiptKey, document: MaterialDocument) -> Self {
        Self {
            goods_receipt: Some(key),
            material_document: Some(document),
            ..self
        }
    }

    pub fn with_country_of_origin(self, country: Option<String>) -> Self {
        Self {
            country_of_origin: country,
            ..self
        }
    }

    pub fn with_handling_units(self, units: Vec<HandlingUnit>) -> Self {
        Self {
            handling_units: units,
            ..self
        }
    }

    /// Checks that every mandatory slot is filled.
    pub fn build(self) -> Result<ResolvedLabelState, ServiceError> {
        let inbound_delivery = self
            .inbound_delivery
            .ok_or_else(|| ServiceError::pipeline("Inbound delivery not resolved"))?;
        let delivery_item = self
            .delivery_item
            .ok_or_else(|| ServiceError::pipeline("No IBD items"))?;
        let order = self
            .order
            .ok_or_else(|| ServiceError::pipeline("Order reference not resolved"))?;
        let goods_receipt = self
            .goods_receipt
            .ok_or_else(|| ServiceError::pipeline("No Goods Receipt found"))?;
        let material_document = self
            .material_document
            .ok_or_else(|| ServiceError::pipeline("Material document not resolved"))?;
        if self.handling_units.is_empty() {
            return Err(ServiceError::pipeline(format!(
                "No handling units found for inbound delivery {}",
                inbound_delivery
            )));
        }

        Ok(ResolvedLabelState {
            scan: self.scan,
            warehouse: self.warehouse,
            scanned_unit: self.scanned_unit,
            inbound_delivery,
            delivery_item,
            order,
            goods_receipt,
            material_document,
            country_of_origin: self.country_of_origin,
            handling_units: self.handling_units,
        })
    }
}

use async_trait::async_trait;
use std::fmt;

use crate::errors::ServiceResult;
use crate::models::{
    DocumentFlowEntry, HandlingUnit, InboundDeliveryItem, MaterialDocumentHeader,
    MaterialDocumentItem, ProductPlant, PurchaseOrder,
};

pub mod in_memory;
pub mod odata_client;

pub use in_memory::InMemoryDocumentRepository;
pub use odata_client::ODataClient;

/// Logical document stores the label pipeline reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    HandlingUnit,
    InboundDelivery,
    PurchaseOrder,
    DocumentFlow,
    MaterialDocumentHeader,
    MaterialDocumentItem,
    ProductPlant,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HandlingUnit => "Handling unit",
            Self::InboundDelivery => "Inbound delivery",
            Self::PurchaseOrder => "Purchase order",
            Self::DocumentFlow => "Document flow",
            Self::MaterialDocumentHeader => "Material document header",
            Self::MaterialDocumentItem => "Material document item",
            Self::ProductPlant => "Product plant",
        };
        f.write_str(name)
    }
}

/// Store-specific composite key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    HandlingUnit {
        external_id: String,
        warehouse: String,
    },
    /// All units packed against a reference document in one warehouse
    HandlingUnitsByReference {
        reference_document: String,
        warehouse: String,
    },
    InboundDelivery {
        delivery: String,
    },
    PurchaseOrder {
        purchase_order: String,
    },
    DocumentFlow {
        delivery: String,
        item: String,
    },
    MaterialDocumentHeader {
        document: String,
        year: String,
    },
    MaterialDocumentItem {
        document: String,
        year: String,
        item: String,
    },
    ProductPlant {
        product: String,
        plant: String,
    },
}

impl DocumentKey {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::HandlingUnit { .. } | Self::HandlingUnitsByReference { .. } => {
                DocumentKind::HandlingUnit
            }
            Self::InboundDelivery { .. } => DocumentKind::InboundDelivery,
            Self::PurchaseOrder { .. } => DocumentKind::PurchaseOrder,
            Self::DocumentFlow { .. } => DocumentKind::DocumentFlow,
            Self::MaterialDocumentHeader { .. } => DocumentKind::MaterialDocumentHeader,
            Self::MaterialDocumentItem { .. } => DocumentKind::MaterialDocumentItem,
            Self::ProductPlant { .. } => DocumentKind::ProductPlant,
        }
    }

    /// Related collection fetched in the same round trip by default
    pub fn default_expand(&self) -> Option<&'static str> {
        match self {
            Self::HandlingUnit { .. } | Self::HandlingUnitsByReference { .. } => {
                Some("_HandlingUnitItem")
            }
            Self::PurchaseOrder { .. } => Some("_PurchaseOrderItem"),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandlingUnit {
                external_id,
                warehouse,
            } => write!(f, "{} (warehouse {})", external_id, warehouse),
            Self::HandlingUnitsByReference {
                reference_document,
                warehouse,
            } => write!(
                f,
                "reference {} (warehouse {})",
                reference_document, warehouse
            ),
            Self::InboundDelivery { delivery } => f.write_str(delivery),
            Self::PurchaseOrder { purchase_order } => f.write_str(purchase_order),
            Self::DocumentFlow { delivery, item } => write!(f, "{}/{}", delivery, item),
            Self::MaterialDocumentHeader { document, year } => write!(f, "{}/{}", document, year),
            Self::MaterialDocumentItem {
                document,
                year,
                item,
            } => write!(f, "{}/{}/{}", document, year, item),
            Self::ProductPlant { product, plant } => write!(f, "{}/{}", product, plant),
        }
    }
}

/// Typed read access to the remote document stores.
///
/// Every method fails with `ServiceError::NotFound` when the store has no
/// record for the key (for collections: when the result set is empty) and with
/// `ServiceError::TransportError` when the call cannot complete.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn handling_unit(&self, external_id: &str, warehouse: &str)
        -> ServiceResult<HandlingUnit>;

    async fn handling_units_for_reference(
        &self,
        reference_document: &str,
        warehouse: &str,
    ) -> ServiceResult<Vec<HandlingUnit>>;

    async fn inbound_delivery_items(&self, delivery: &str)
        -> ServiceResult<Vec<InboundDeliveryItem>>;

    async fn purchase_order(&self, purchase_order: &str) -> ServiceResult<PurchaseOrder>;

    async fn document_flow(
        &self,
        delivery: &str,
        item: &str,
    ) -> ServiceResult<Vec<DocumentFlowEntry>>;

    async fn material_document_header(
        &self,
        document: &str,
        year: &str,
    ) -> ServiceResult<MaterialDocumentHeader>;

    async fn material_document_item(
        &self,
        document: &str,
        year: &str,
        item: &str,
    ) -> ServiceResult<MaterialDocumentItem>;

    async fn product_plant(&self, product: &str, plant: &str) -> ServiceResult<ProductPlant>;
}

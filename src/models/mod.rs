// Remote document models
pub mod document_flow;
pub mod handling_unit;
pub mod inbound_delivery;
pub mod material_document;
pub mod odata;
pub mod product_plant;
pub mod purchase_order;

// Pipeline and print models
pub mod label;
pub mod operator_entries;
pub mod resolved_state;

pub use document_flow::{DocumentFlowEntry, FlowCategory, GoodsReceiptKey};
pub use handling_unit::{HandlingUnit, HandlingUnitItem};
pub use inbound_delivery::InboundDeliveryItem;
pub use label::{AuditRecord, LabelRecord, PrintPayload, AUDIT_FIELD_LIMIT};
pub use material_document::{MaterialDocument, MaterialDocumentHeader, MaterialDocumentItem};
pub use operator_entries::{CountryOfOriginField, OperatorEntries};
pub use product_plant::ProductPlant;
pub use purchase_order::{PurchaseOrder, PurchaseOrderItem};
pub use resolved_state::{
    LabelStateBuilder, OrderReference, ProductionOrderRef, ResolvedLabelState, ScanInput,
};

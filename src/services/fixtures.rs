//! Shared test data: one PO-backed inbound delivery with a goods receipt and
//! three handling units, two of them in the latest cohort.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::{
    CountryOfOriginField, DocumentFlowEntry, GoodsReceiptKey, HandlingUnit, HandlingUnitItem,
    InboundDeliveryItem, MaterialDocument, MaterialDocumentHeader, MaterialDocumentItem,
    OperatorEntries, OrderReference, ProductPlant, PurchaseOrder, PurchaseOrderItem,
    ResolvedLabelState, ScanInput,
};
use crate::repositories::InMemoryDocumentRepository;

pub const WAREHOUSE: &str = "1050";
pub const IBD: &str = "1800000123";
pub const PO: &str = "4500001111";
pub const HU_OLD: &str = "100000000000";
pub const HU_1: &str = "100000000001";
pub const HU_2: &str = "100000000002";

pub fn created(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 15, 0).unwrap()
}

pub fn handling_unit(id: &str, created_at: Option<DateTime<Utc>>) -> HandlingUnit {
    HandlingUnit {
        external_id: id.to_string(),
        internal_id: Some(format!("9{}", id)),
        warehouse: WAREHOUSE.to_string(),
        packaging_material: "PALLET-EU".to_string(),
        storage_location: "0001".to_string(),
        storage_bin: "GR-ZONE-01".to_string(),
        storage_type: "902".to_string(),
        reference_document: Some(IBD.to_string()),
        created_at,
        items: vec![HandlingUnitItem {
            material: "MAT-100".to_string(),
            quantity: Some("40".to_string()),
            unit: "EA".to_string(),
            description: Some("Hex bolt M8".to_string()),
        }],
    }
}

pub fn delivery_item(category: &str) -> InboundDeliveryItem {
    InboundDeliveryItem {
        delivery_document: IBD.to_string(),
        delivery_document_item: "000010".to_string(),
        material: "MAT-100".to_string(),
        item_text: Some("Hex bolt M8 zinc".to_string()),
        plant: "1050".to_string(),
        storage_location: "0001".to_string(),
        batch: "B2026-07".to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2028, 2, 29),
        manufacture_date: NaiveDate::from_ymd_opt(2026, 2, 1),
        item_category: category.to_string(),
        reference_sd_document: Some(PO.to_string()),
        reference_sd_document_item: Some("00010".to_string()),
        order_id: Some("1000456".to_string()),
        order_item: Some("0001".to_string()),
    }
}

pub fn purchase_order() -> PurchaseOrder {
    PurchaseOrder {
        purchase_order: PO.to_string(),
        supplier: "V-20001".to_string(),
        items: vec![PurchaseOrderItem {
            purchase_order_item: "00010".to_string(),
            item_text: "Hex bolt M8 x 40".to_string(),
            manufacturer_material: "HB-M8-40".to_string(),
            stock_type: "X".to_string(),
            purchase_order_category: Some("K".to_string()),
        }],
    }
}

pub fn flow_entry(document: &str, item: Option<&str>) -> DocumentFlowEntry {
    DocumentFlowEntry {
        preceding_document: IBD.to_string(),
        preceding_document_item: "000010".to_string(),
        subsequent_document_category: "R".to_string(),
        subsequent_document: document.to_string(),
        subsequent_document_item: item.map(str::to_string),
        subsequent_document_year: None,
    }
}

/// Delivery, PO, flow and material document; no units, no country.
pub fn seed_documents(repo: &InMemoryDocumentRepository) {
    repo.insert_delivery_items(IBD, vec![delivery_item("NORM")]);
    repo.insert_purchase_order(purchase_order());

    let mut handling_unit_edge = flow_entry("900000001", None);
    handling_unit_edge.subsequent_document_category = "H".to_string();
    repo.insert_document_flow(
        IBD,
        "000010",
        vec![
            flow_entry("5000000009", Some("000001")),
            handling_unit_edge,
            flow_entry("5000000042", Some("000001")),
        ],
    );

    repo.insert_material_document(
        MaterialDocumentHeader {
            material_document: "5000000042".to_string(),
            material_document_year: "2026".to_string(),
            creation_date: NaiveDate::from_ymd_opt(2026, 3, 2),
        },
        MaterialDocumentItem {
            material_document: "5000000042".to_string(),
            material_document_year: "2026".to_string(),
            material_document_item: "0001".to_string(),
            quantity_in_base_unit: Some("120".to_string()),
            base_unit: "EA".to_string(),
        },
    );
}

/// Everything except the product-plant record.
pub fn seed_without_country(repo: &InMemoryDocumentRepository) {
    seed_documents(repo);
    repo.insert_handling_unit(handling_unit(HU_OLD, Some(created(8))));
    repo.insert_handling_unit(handling_unit(HU_1, Some(created(11))));
    repo.insert_handling_unit(handling_unit(HU_2, Some(created(11))));
}

pub fn seeded_repository() -> InMemoryDocumentRepository {
    let repo = InMemoryDocumentRepository::new();
    seed_without_country(&repo);
    repo.insert_product_plant(ProductPlant {
        product: "MAT-100".to_string(),
        plant: "1050".to_string(),
        country_of_origin: Some("de".to_string()),
    });
    repo
}

/// Ready state for a PO-backed delivery with `units` handling units.
pub fn resolved_state(units: usize) -> ResolvedLabelState {
    let purchase_order = purchase_order();
    let item = purchase_order.items[0].clone();
    ResolvedLabelState {
        scan: ScanInput::InboundDelivery(IBD.to_string()),
        warehouse: WAREHOUSE.to_string(),
        scanned_unit: None,
        inbound_delivery: IBD.to_string(),
        delivery_item: delivery_item("NORM"),
        order: OrderReference::PurchaseOrderBacked {
            purchase_order,
            item,
        },
        goods_receipt: GoodsReceiptKey {
            material_document: "5000000042".to_string(),
            fiscal_year: "2026".to_string(),
            item: "0001".to_string(),
        },
        material_document: MaterialDocument {
            document_number: "5000000042".to_string(),
            fiscal_year: "2026".to_string(),
            item: "0001".to_string(),
            creation_date: NaiveDate::from_ymd_opt(2026, 3, 2),
            quantity_in_base_unit: Some("120".to_string()),
            base_unit: "EA".to_string(),
        },
        country_of_origin: Some("DE".to_string()),
        handling_units: (1..=units)
            .map(|i| handling_unit(&format!("1000000000{:02}", i), Some(created(11))))
            .collect(),
    }
}

/// Entries an operator would have typed for [`resolved_state`].
pub fn operator_entries() -> OperatorEntries {
    OperatorEntries {
        country_of_origin: CountryOfOriginField::prefilled("DE"),
        lot: "EI-7781".to_string(),
        label_format: "LBL-4X6".to_string(),
        printer: "PRN-07".to_string(),
    }
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request},
    Router,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use inbound_label::{
    config::{AppConfig, EndpointConfig},
    errors::{ServiceError, ServiceResult},
    models::{
        DocumentFlowEntry, HandlingUnit, HandlingUnitItem, InboundDeliveryItem,
        MaterialDocumentHeader, MaterialDocumentItem, PrintPayload, ProductPlant, PurchaseOrder,
        PurchaseOrderItem,
    },
    repositories::InMemoryDocumentRepository,
    services::{CountryRegistry, PrintGateway},
    AppState,
};

pub const WAREHOUSE: &str = "1050";
pub const IBD: &str = "1800000123";
pub const PO: &str = "4500001111";
pub const GR_DOC: &str = "5000000042";
pub const HU_OLD: &str = "100000000000";
pub const HU_1: &str = "100000000001";
pub const HU_2: &str = "100000000002";

/// Gateway double that keeps every payload and can reject one unit.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<PrintPayload>>,
    reject: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingGateway {
    pub fn reject_unit(&self, hu: &str) {
        *self.reject.lock().unwrap() = Some(hu.to_string());
    }

    pub fn delay_each(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<PrintPayload> {
        self.sent.lock().unwrap().clone()
    }

    pub fn printed_units(&self) -> Vec<String> {
        self.sent().into_iter().map(|p| p.order_hu.hu).collect()
    }
}

#[async_trait]
impl PrintGateway for RecordingGateway {
    async fn submit(&self, payload: &PrintPayload) -> ServiceResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject.lock().unwrap().as_deref() == Some(payload.order_hu.hu.as_str()) {
            return Err(ServiceError::PrintGatewayError("printer offline".to_string()));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

pub fn created(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 15, 0).unwrap()
}

pub fn handling_unit(id: &str, created_at: DateTime<Utc>) -> HandlingUnit {
    HandlingUnit {
        external_id: id.to_string(),
        internal_id: Some(format!("9{}", id)),
        warehouse: WAREHOUSE.to_string(),
        packaging_material: "PALLET-EU".to_string(),
        storage_location: "0001".to_string(),
        storage_bin: "GR-ZONE-01".to_string(),
        storage_type: "902".to_string(),
        reference_document: Some(IBD.to_string()),
        created_at: Some(created_at),
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

fn goods_receipt(document: &str) -> DocumentFlowEntry {
    DocumentFlowEntry {
        preceding_document: IBD.to_string(),
        preceding_document_item: "000010".to_string(),
        subsequent_document_category: "R".to_string(),
        subsequent_document: document.to_string(),
        subsequent_document_item: Some("000001".to_string()),
        subsequent_document_year: Some("2026".to_string()),
    }
}

/// One delivery with two goods receipts and three units, two of them in the
/// latest cohort. `category` decides PO or production backing.
pub fn seeded_repository(category: &str) -> InMemoryDocumentRepository {
    let repo = InMemoryDocumentRepository::new();
    repo.insert_delivery_items(IBD, vec![delivery_item(category)]);
    repo.insert_purchase_order(PurchaseOrder {
        purchase_order: PO.to_string(),
        supplier: "V-20001".to_string(),
        items: vec![PurchaseOrderItem {
            purchase_order_item: "00010".to_string(),
            item_text: "Hex bolt M8 x 40".to_string(),
            manufacturer_material: "HB-M8-40".to_string(),
            stock_type: "X".to_string(),
            purchase_order_category: Some("K".to_string()),
        }],
    });
    repo.insert_document_flow(
        IBD,
        "000010",
        vec![goods_receipt("5000000009"), goods_receipt(GR_DOC)],
    );
    repo.insert_material_document(
        MaterialDocumentHeader {
            material_document: GR_DOC.to_string(),
            material_document_year: "2026".to_string(),
            creation_date: NaiveDate::from_ymd_opt(2026, 3, 2),
        },
        MaterialDocumentItem {
            material_document: GR_DOC.to_string(),
            material_document_year: "2026".to_string(),
            material_document_item: "0001".to_string(),
            quantity_in_base_unit: Some("120".to_string()),
            base_unit: "EA".to_string(),
        },
    );
    repo.insert_product_plant(ProductPlant {
        product: "MAT-100".to_string(),
        plant: "1050".to_string(),
        country_of_origin: Some("DE".to_string()),
    });
    repo.insert_handling_unit(handling_unit(HU_OLD, created(8)));
    repo.insert_handling_unit(handling_unit(HU_1, created(11)));
    repo.insert_handling_unit(handling_unit(HU_2, created(11)));
    repo
}

pub fn test_config() -> AppConfig {
    AppConfig::new("test".to_string(), EndpointConfig::default())
}

/// Router over an in-memory document store and a recording gateway.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub repository: Arc<InMemoryDocumentRepository>,
    pub gateway: Arc<RecordingGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(seeded_repository("NORM"))
    }

    pub fn with_repository(repository: InMemoryDocumentRepository) -> Self {
        Self::with_config(test_config(), repository)
    }

    pub fn with_config(config: AppConfig, repository: InMemoryDocumentRepository) -> Self {
        let repository = Arc::new(repository);
        let gateway = Arc::new(RecordingGateway::default());
        let countries = CountryRegistry::embedded().expect("embedded country list");
        let state = AppState::new(
            config,
            repository.clone(),
            gateway.clone(),
            None,
            countries,
        );
        let router = inbound_label::build_router(state.clone());

        Self {
            router,
            state,
            repository,
            gateway,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

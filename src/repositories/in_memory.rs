use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DocumentKey, DocumentKind, DocumentRepository};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{
    DocumentFlowEntry, HandlingUnit, InboundDeliveryItem, MaterialDocumentHeader,
    MaterialDocumentItem, ProductPlant, PurchaseOrder,
};

#[derive(Debug, Default)]
struct Store {
    handling_units: Vec<HandlingUnit>,
    delivery_items: HashMap<String, Vec<InboundDeliveryItem>>,
    purchase_orders: HashMap<String, PurchaseOrder>,
    document_flows: HashMap<(String, String), Vec<DocumentFlowEntry>>,
    material_headers: HashMap<(String, String), MaterialDocumentHeader>,
    material_items: HashMap<(String, String, String), MaterialDocumentItem>,
    product_plants: HashMap<(String, String), ProductPlant>,
    unavailable: HashSet<DocumentKind>,
    calls: Vec<DocumentKey>,
}

/// Document repository held in memory, for tests and offline runs.
///
/// Every read is recorded so callers can assert the order of lookups.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_handling_unit(&self, unit: HandlingUnit) {
        self.lock().handling_units.push(unit);
    }

    pub fn insert_delivery_items(&self, delivery: &str, items: Vec<InboundDeliveryItem>) {
        self.lock()
            .delivery_items
            .insert(delivery.to_string(), items);
    }

    pub fn insert_purchase_order(&self, order: PurchaseOrder) {
        self.lock()
            .purchase_orders
            .insert(order.purchase_order.clone(), order);
    }

    pub fn insert_document_flow(&self, delivery: &str, item: &str, entries: Vec<DocumentFlowEntry>) {
        self.lock()
            .document_flows
            .insert((delivery.to_string(), item.to_string()), entries);
    }

    pub fn insert_material_document(&self, header: MaterialDocumentHeader, item: MaterialDocumentItem) {
        let mut store = self.lock();
        store.material_headers.insert(
            (
                header.material_document.clone(),
                header.material_document_year.clone(),
            ),
            header,
        );
        store.material_items.insert(
            (
                item.material_document.clone(),
                item.material_document_year.clone(),
                item.material_document_item.clone(),
            ),
            item,
        );
    }

    pub fn insert_product_plant(&self, record: ProductPlant) {
        self.lock()
            .product_plants
            .insert((record.product.clone(), record.plant.clone()), record);
    }

    /// Makes every read of `kind` fail with a transport error.
    pub fn make_unavailable(&self, kind: DocumentKind) {
        self.lock().unavailable.insert(kind);
    }

    /// Keys read so far, in call order
    pub fn calls(&self) -> Vec<DocumentKey> {
        self.lock().calls.clone()
    }

    fn read<T>(&self, key: DocumentKey, lookup: impl FnOnce(&Store) -> Option<T>) -> ServiceResult<T> {
        let mut store = self.lock();
        store.calls.push(key.clone());
        if store.unavailable.contains(&key.kind()) {
            return Err(ServiceError::transport(format!(
                "{} {}: service unavailable",
                key.kind(),
                key
            )));
        }
        lookup(&store).ok_or_else(|| ServiceError::not_found(format!("{} {}", key.kind(), key)))
    }
}

fn non_empty<T>(records: Vec<T>) -> Option<Vec<T>> {
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn handling_unit(&self, external_id: &str, warehouse: &str) -> ServiceResult<HandlingUnit> {
        let key = DocumentKey::HandlingUnit {
            external_id: external_id.to_string(),
            warehouse: warehouse.to_string(),
        };
        self.read(key, |store| {
            store
                .handling_units
                .iter()
                .find(|hu| hu.external_id == external_id && hu.warehouse == warehouse)
                .cloned()
        })
    }

    async fn handling_units_for_reference(
        &self,
        reference_document: &str,
        warehouse: &str,
    ) -> ServiceResult<Vec<HandlingUnit>> {
        let key = DocumentKey::HandlingUnitsByReference {
            reference_document: reference_document.to_string(),
            warehouse: warehouse.to_string(),
        };
        self.read(key, |store| {
            non_empty(
                store
                    .handling_units
                    .iter()
                    .filter(|hu| {
                        hu.reference_document.as_deref() == Some(reference_document)
                            && hu.warehouse == warehouse
                    })
                    .cloned()
                    .collect(),
            )
        })
    }

    async fn inbound_delivery_items(&self, delivery: &str) -> ServiceResult<Vec<InboundDeliveryItem>> {
        let key = DocumentKey::InboundDelivery {
            delivery: delivery.to_string(),
        };
        self.read(key, |store| {
            store.delivery_items.get(delivery).cloned().and_then(non_empty)
        })
    }

    async fn purchase_order(&self, purchase_order: &str) -> ServiceResult<PurchaseOrder> {
        let key = DocumentKey::PurchaseOrder {
            purchase_order: purchase_order.to_string(),
        };
        self.read(key, |store| store.purchase_orders.get(purchase_order).cloned())
    }

    async fn document_flow(&self, delivery: &str, item: &str) -> ServiceResult<Vec<DocumentFlowEntry>> {
        let key = DocumentKey::DocumentFlow {
            delivery: delivery.to_string(),
            item: item.to_string(),
        };
        self.read(key, |store| {
            store
                .document_flows
                .get(&(delivery.to_string(), item.to_string()))
                .cloned()
                .and_then(non_empty)
        })
    }

    async fn material_document_header(
        &self,
        document: &str,
        year: &str,
    ) -> ServiceResult<MaterialDocumentHeader> {
        let key = DocumentKey::MaterialDocumentHeader {
            document: document.to_string(),
            year: year.to_string(),
        };
        self.read(key, |store| {
            store
                .material_headers
                .get(&(document.to_string(), year.to_string()))
                .cloned()
        })
    }

    async fn material_document_item(
        &self,
        document: &str,
        year: &str,
        item: &str,
    ) -> ServiceResult<MaterialDocumentItem> {
        let key = DocumentKey::MaterialDocumentItem {
            document: document.to_string(),
            year: year.to_string(),
            item: item.to_string(),
        };
        self.read(key, |store| {
            store
                .material_items
                .get(&(document.to_string(), year.to_string(), item.to_string()))
                .cloned()
        })
    }

    async fn product_plant(&self, product: &str, plant: &str) -> ServiceResult<ProductPlant> {
        let key = DocumentKey::ProductPlant {
            product: product.to_string(),
            plant: plant.to_string(),
        };
        self.read(key, |store| {
            store
                .product_plants
                .get(&(product.to_string(), plant.to_string()))
                .cloned()
        })
    }
}

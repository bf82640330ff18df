use async_trait::async_trait;
use serde::de::DeserializeOwned;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{DocumentKey, DocumentKind, DocumentRepository};
use crate::config::{AppConfig, EndpointConfig};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{
    DocumentFlowEntry, HandlingUnit, InboundDeliveryItem, MaterialDocumentHeader,
    MaterialDocumentItem, ProductPlant, PurchaseOrder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    V2,
    V4,
}

/// A fully formed OData read
#[derive(Debug, Clone, PartialEq)]
struct ODataRequest {
    url: Url,
    query: Vec<(&'static str, String)>,
}

/// Read-only client for the OData document services
#[derive(Debug, Clone)]
pub struct ODataClient {
    client: reqwest::Client,
    endpoints: EndpointConfig,
}

impl ODataClient {
    pub fn new(endpoints: EndpointConfig, timeout: Duration) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client, endpoints })
    }

    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        Self::new(config.endpoints.clone(), config.request_timeout())
    }

    /// Reads the records stored under `key`, normalised to a list.
    ///
    /// Single-entity reads yield one element. An empty result is `NotFound`.
    #[instrument(skip(self), fields(kind = %key.kind()))]
    pub async fn fetch(&self, key: &DocumentKey, expand: Option<&str>) -> ServiceResult<Vec<Value>> {
        let request = self.build_request(key, expand)?;
        debug!(url = %request.url, "OData read");

        let response = self
            .client
            .get(request.url)
            .header("Accept", "application/json")
            .query(&request.query)
            .send()
            .await
            .map_err(|e| {
                warn!("{} {} request failed: {}", key.kind(), key, e);
                ServiceError::transport(format!("{} {}: {}", key.kind(), key, e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::not_found(format!("{} {}", key.kind(), key)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} {} returned {}: {}", key.kind(), key, status, body);
            return Err(ServiceError::transport(format!(
                "{} {} returned {}",
                key.kind(),
                key,
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            ServiceError::transport(format!("{} {}: invalid JSON: {}", key.kind(), key, e))
        })?;

        let records = unwrap_envelope(body);
        if records.is_empty() {
            return Err(ServiceError::not_found(format!("{} {}", key.kind(), key)));
        }
        debug!(count = records.len(), "OData read complete");
        Ok(records)
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, key: DocumentKey) -> ServiceResult<Vec<T>> {
        self.fetch(&key, key.default_expand())
            .await?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record).map_err(|e| {
                    ServiceError::transport(format!("{} {}: unexpected payload: {}", key.kind(), key, e))
                })
            })
            .collect()
    }

    async fn fetch_one<T: DeserializeOwned>(&self, key: DocumentKey) -> ServiceResult<T> {
        let kind = key.kind();
        self.fetch_typed(key)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found(kind.to_string()))
    }

    fn base_url(&self, kind: DocumentKind) -> &str {
        let url = match kind {
            DocumentKind::HandlingUnit => &self.endpoints.handling_unit_url,
            DocumentKind::InboundDelivery | DocumentKind::DocumentFlow => {
                &self.endpoints.inbound_delivery_url
            }
            DocumentKind::PurchaseOrder => &self.endpoints.purchase_order_url,
            DocumentKind::MaterialDocumentHeader | DocumentKind::MaterialDocumentItem => {
                &self.endpoints.material_document_url
            }
            DocumentKind::ProductPlant => &self.endpoints.product_master_url,
        };
        url.trim_end_matches('/')
    }

    /// Builds the request URL. Each path segment is percent-encoded, so key
    /// values cannot leak into the query or fragment.
    fn build_request(&self, key: &DocumentKey, expand: Option<&str>) -> ServiceResult<ODataRequest> {
        let kind = key.kind();
        let segments: Vec<String> = match key {
            DocumentKey::HandlingUnit {
                external_id,
                warehouse,
            } => vec![format!(
                "HandlingUnit(HandlingUnitExternalID='{}',Warehouse='{}')",
                literal(external_id),
                literal(warehouse)
            )],
            DocumentKey::HandlingUnitsByReference { .. } => vec!["HandlingUnit".to_string()],
            DocumentKey::InboundDelivery { delivery } => vec![
                format!("A_InbDeliveryHeader('{}')", literal(delivery)),
                "to_DeliveryDocumentItem".to_string(),
            ],
            DocumentKey::PurchaseOrder { purchase_order } => {
                vec![format!("PurchaseOrder('{}')", literal(purchase_order))]
            }
            DocumentKey::DocumentFlow { delivery, item } => vec![
                format!(
                    "A_InbDeliveryItem(DeliveryDocument='{}',DeliveryDocumentItem='{}')",
                    literal(delivery),
                    literal(item)
                ),
                "to_DocumentFlow".to_string(),
            ],
            DocumentKey::MaterialDocumentHeader { document, year } => vec![format!(
                "A_MaterialDocumentHeader(MaterialDocument='{}',MaterialDocumentYear='{}')",
                literal(document),
                literal(year)
            )],
            DocumentKey::MaterialDocumentItem {
                document,
                year,
                item,
            } => vec![format!(
                "A_MaterialDocumentItem(MaterialDocument='{}',MaterialDocumentYear='{}',MaterialDocumentItem='{}')",
                literal(document),
                literal(year),
                literal(item)
            )],
            DocumentKey::ProductPlant { product, plant } => vec![format!(
                "A_ProductPlant(Product='{}',Plant='{}')",
                literal(product),
                literal(plant)
            )],
        };

        let base = self.base_url(kind);
        let mut url = Url::parse(base)
            .map_err(|e| ServiceError::ConfigError(format!("{} URL {}: {}", kind, base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::ConfigError(format!("{} URL {} cannot take a path", kind, base)))?
            .pop_if_empty()
            .extend(segments.iter().map(String::as_str));

        let mut query = Vec::new();
        if let DocumentKey::HandlingUnitsByReference {
            reference_document,
            warehouse,
        } = key
        {
            query.push((
                "$filter",
                format!(
                    "HandlingUnitReferenceDocument eq '{}' and Warehouse eq '{}'",
                    literal(reference_document),
                    literal(warehouse)
                ),
            ));
        }
        if let Some(expand) = expand {
            query.push(("$expand", expand.to_string()));
        }
        if protocol(kind) == Protocol::V2 {
            query.push(("$format", "json".to_string()));
        }

        Ok(ODataRequest { url, query })
    }
}

fn protocol(kind: DocumentKind) -> Protocol {
    match kind {
        DocumentKind::HandlingUnit | DocumentKind::PurchaseOrder => Protocol::V4,
        _ => Protocol::V2,
    }
}

/// Escapes a value for use inside a quoted OData literal.
fn literal(value: &str) -> String {
    value.trim().replace('\'', "''")
}

/// Flattens V2 (`d` / `d.results`) and V4 (`value` / bare entity) envelopes.
fn unwrap_envelope(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => {
            if let Some(d) = map.remove("d") {
                return unwrap_v2(d);
            }
            match map.remove("value") {
                Some(Value::Array(records)) => records,
                Some(other) => {
                    map.insert("value".to_string(), other);
                    vec![Value::Object(map)]
                }
                None => vec![Value::Object(map)],
            }
        }
        Value::Array(records) => records,
        _ => Vec::new(),
    }
}

fn unwrap_v2(d: Value) -> Vec<Value> {
    match d {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(records)) => records,
            Some(other) => {
                map.insert("results".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        Value::Array(records) => records,
        _ => Vec::new(),
    }
}

#[async_trait]
impl DocumentRepository for ODataClient {
    async fn handling_unit(&self, external_id: &str, warehouse: &str) -> ServiceResult<HandlingUnit> {
        self.fetch_one(DocumentKey::HandlingUnit {
            external_id: external_id.to_string(),
            warehouse: warehouse.to_string(),
        })
        .await
    }

    async fn handling_units_for_reference(
        &self,
        reference_document: &str,
        warehouse: &str,
    ) -> ServiceResult<Vec<HandlingUnit>> {
        self.fetch_typed(DocumentKey::HandlingUnitsByReference {
            reference_document: reference_document.to_string(),
            warehouse: warehouse.to_string(),
        })
        .await
    }

    async fn inbound_delivery_items(&self, delivery: &str) -> ServiceResult<Vec<InboundDeliveryItem>> {
        self.fetch_typed(DocumentKey::InboundDelivery {
            delivery: delivery.to_string(),
        })
        .await
    }

    async fn purchase_order(&self, purchase_order: &str) -> ServiceResult<PurchaseOrder> {
        self.fetch_one(DocumentKey::PurchaseOrder {
            purchase_order: purchase_order.to_string(),
        })
        .await
    }

    async fn document_flow(&self, delivery: &str, item: &str) -> ServiceResult<Vec<DocumentFlowEntry>> {
        self.fetch_typed(DocumentKey::DocumentFlow {
            delivery: delivery.to_string(),
            item: item.to_string(),
        })
        .await
    }

    async fn material_document_header(
        &self,
        document: &str,
        year: &str,
    ) -> ServiceResult<MaterialDocumentHeader> {
        self.fetch_one(DocumentKey::MaterialDocumentHeader {
            document: document.to_string(),
            year: year.to_string(),
        })
        .await
    }

    async fn material_document_item(
        &self,
        document: &str,
        year: &str,
        item: &str,
    ) -> ServiceResult<MaterialDocumentItem> {
        self.fetch_one(DocumentKey::MaterialDocumentItem {
            document: document.to_string(),
            year: year.to_string(),
            item: item.to_string(),
        })
        .await
    }

    async fn product_plant(&self, product: &str, plant: &str) -> ServiceResult<ProductPlant> {
        self.fetch_one(DocumentKey::ProductPlant {
            product: product.to_string(),
            plant: plant.to_string(),
        })
        .await
    }
}

//! Multi-stage resolution of a scan into a print-ready label state.
//!
//! A run walks HU → IBD → PO or production order → document flow → material
//! document → country of origin → latest handling units. Each stage awaits the
//! previous one; the first failure aborts the run with its message intact.

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::{
    LabelStateBuilder, MaterialDocument, OrderReference, ProductionOrderRef, ResolvedLabelState,
    ScanInput,
};
use crate::repositories::DocumentRepository;
use crate::services::selection::{
    goods_receipt_key, representative_delivery_item, representative_purchase_order_item,
    select_latest, select_latest_goods_receipt,
};

/// Minimum scanned length that submits a handling unit without Enter.
pub const AUTO_SUBMIT_MIN_LEN: usize = 9;

/// True when a changed HU field should start the pipeline on its own.
pub fn should_auto_submit(value: &str) -> bool {
    value.trim().chars().count() >= AUTO_SUBMIT_MIN_LEN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    FetchingPrimary,
    FetchingDependents,
    Validating,
    Ready,
    Dispatching,
    Failed,
}

impl PipelineStage {
    fn can_move_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Idle, FetchingPrimary)
                | (Ready, FetchingPrimary)
                | (FetchingPrimary, FetchingDependents)
                | (FetchingDependents, Validating)
                | (Validating, Ready)
                | (Ready, Dispatching)
                | (Ready, Idle)
                | (Dispatching, Idle)
                | (Failed, Idle)
                | (FetchingPrimary, Failed)
                | (FetchingDependents, Failed)
                | (Validating, Failed)
                | (Dispatching, Failed)
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingPrimary => "fetching primary",
            Self::FetchingDependents => "fetching dependents",
            Self::Validating => "validating",
            Self::Ready => "ready",
            Self::Dispatching => "dispatching",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Records the run state machine and refuses illegal transitions.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: PipelineStage,
    history: Vec<PipelineStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    /// Every stage entered so far, oldest first
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    pub fn advance(&mut self, next: PipelineStage) -> ServiceResult<()> {
        if !self.current.can_move_to(next) {
            return Err(ServiceError::InternalError(format!(
                "Illegal pipeline transition {} -> {}",
                self.current, next
            )));
        }
        info!(from = %self.current, to = %next, "Pipeline stage");
        self.current = next;
        self.history.push(next);
        Ok(())
    }

    /// Marks the active run as failed, then returns to idle.
    pub fn fail_and_reset(&mut self) {
        if self.current.can_move_to(PipelineStage::Failed) {
            self.current = PipelineStage::Failed;
            self.history.push(PipelineStage::Failed);
        }
        self.current = PipelineStage::Idle;
        self.history.push(PipelineStage::Idle);
    }
}

#[derive(Clone)]
pub struct ResolutionPipeline {
    repository: Arc<dyn DocumentRepository>,
    production_item_category: String,
    fiscal_year: Option<i32>,
}

impl ResolutionPipeline {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        production_item_category: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            production_item_category: production_item_category.into(),
            fiscal_year: None,
        }
    }

    /// Pins the fallback fiscal year instead of reading the clock.
    pub fn with_fiscal_year(mut self, year: i32) -> Self {
        self.fiscal_year = Some(year);
        self
    }

    fn fallback_fiscal_year(&self) -> i32 {
        self.fiscal_year.unwrap_or_else(|| Utc::now().year())
    }

    pub async fn run(&self, scan: ScanInput, warehouse: &str) -> ServiceResult<ResolvedLabelState> {
        let mut tracker = StageTracker::new();
        self.run_tracked(scan, warehouse, &mut tracker).await
    }

    /// Runs the pipeline, recording stages on `tracker`.
    ///
    /// Success leaves the tracker in `Ready`; failure passes through `Failed`
    /// and returns it to `Idle`.
    #[instrument(skip(self, scan, tracker), fields(scan = %scan.identifier()))]
    pub async fn run_tracked(
        &self,
        scan: ScanInput,
        warehouse: &str,
        tracker: &mut StageTracker,
    ) -> ServiceResult<ResolvedLabelState> {
        tracker.advance(PipelineStage::FetchingPrimary)?;
        match self.resolve(scan, warehouse, tracker).await {
            Ok(state) => {
                tracker.advance(PipelineStage::Ready)?;
                info!(
                    ibd = %state.inbound_delivery,
                    units = state.handling_units.len(),
                    production = state.is_production_order(),
                    "Label state ready"
                );
                Ok(state)
            }
            Err(e) => {
                error!(stage = %tracker.current(), error = %e, "Pipeline aborted");
                tracker.fail_and_reset();
                Err(e)
            }
        }
    }

    async fn resolve(
        &self,
        scan: ScanInput,
        warehouse: &str,
        tracker: &mut StageTracker,
    ) -> ServiceResult<ResolvedLabelState> {
        let builder = self.fetch_primary(scan, warehouse).await?;
        tracker.advance(PipelineStage::FetchingDependents)?;

        let builder = self.fetch_delivery_item(builder).await?;
        let builder = self.resolve_order(builder).await?;
        let builder = self.resolve_goods_receipt(builder).await?;
        let builder = self.resolve_country_of_origin(builder).await?;
        let builder = self.fetch_handling_units(builder).await?;

        tracker.advance(PipelineStage::Validating)?;
        builder.build()
    }

    async fn fetch_primary(&self, scan: ScanInput, warehouse: &str) -> ServiceResult<LabelStateBuilder> {
        match scan {
            ScanInput::HandlingUnit(raw) => {
                let id = raw.trim().to_string();
                if id.is_empty() {
                    return Err(ServiceError::validation("Enter Handling Unit"));
                }
                let unit = self
                    .repository
                    .handling_unit(&id, warehouse)
                    .await
                    .map_err(|e| {
                        if e.is_not_found() {
                            ServiceError::pipeline("HU fetch failed")
                        } else {
                            e
                        }
                    })?;
                let ibd = unit
                    .reference_document
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ServiceError::pipeline("IBD missing inside HU response"))?;
                info!(hu = %id, ibd = %ibd, "Handling unit resolved");
                Ok(LabelStateBuilder::new(ScanInput::HandlingUnit(id), warehouse)
                    .with_scanned_unit(unit, ibd))
            }
            ScanInput::InboundDelivery(raw) => {
                let ibd = raw.trim().to_string();
                if ibd.is_empty() {
                    return Err(ServiceError::validation("Enter Inbound Delivery"));
                }
                Ok(LabelStateBuilder::new(ScanInput::InboundDelivery(ibd), warehouse))
            }
        }
    }

    async fn fetch_delivery_item(&self, builder: LabelStateBuilder) -> ServiceResult<LabelStateBuilder> {
        let ibd = builder
            .inbound_delivery()
            .ok_or_else(|| ServiceError::pipeline("Inbound delivery not resolved"))?;
        let items = self
            .repository
            .inbound_delivery_items(ibd)
            .await
            .map_err(|e| not_found_as(e, "No IBD items"))?;
        let count = items.len();
        let item = representative_delivery_item(items)
            .ok_or_else(|| ServiceError::pipeline("No IBD items"))?;
        info!(
            ibd = %ibd,
            item = %item.delivery_document_item,
            lines = count,
            "Representative delivery item selected"
        );
        Ok(builder.with_delivery_item(item))
    }

    async fn resolve_order(&self, builder: LabelStateBuilder) -> ServiceResult<LabelStateBuilder> {
        let item = builder
            .delivery_item()
            .ok_or_else(|| ServiceError::pipeline("No IBD items"))?;

        if item.item_category.trim() == self.production_item_category {
            let order = ProductionOrderRef {
                order_id: item.order_id.clone().unwrap_or_default(),
                order_item: item.order_item.clone().unwrap_or_default(),
            };
            info!(order = %order.order_id, "Production-order backed delivery");
            return Ok(builder.with_order(OrderReference::ProductionOrderBacked(order)));
        }

        let po_number = item
            .reference_sd_document
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::pipeline("PO number missing"))?
            .to_string();

        let purchase_order = self.repository.purchase_order(&po_number).await?;
        let po_item = representative_purchase_order_item(&purchase_order)
            .cloned()
            .ok_or_else(|| ServiceError::pipeline("No PO items returned"))?;
        info!(
            po = %po_number,
            item = %po_item.purchase_order_item,
            "Purchase-order backed delivery"
        );
        Ok(builder.with_order(OrderReference::PurchaseOrderBacked {
            purchase_order,
            item: po_item,
        }))
    }

    async fn resolve_goods_receipt(&self, builder: LabelStateBuilder) -> ServiceResult<LabelStateBuilder> {
        let (ibd, item) = match (builder.inbound_delivery(), builder.delivery_item()) {
            (Some(ibd), Some(item)) => (ibd, item.delivery_document_item.as_str()),
            _ => return Err(ServiceError::pipeline("No IBD items")),
        };

        let flow = self
            .repository
            .document_flow(ibd, item)
            .await
            .map_err(|e| not_found_as(e, "No Goods Receipt found"))?;
        let entry = select_latest_goods_receipt(&flow)
            .ok_or_else(|| ServiceError::pipeline("No Goods Receipt found"))?;
        let key = goods_receipt_key(entry, self.fallback_fiscal_year());
        info!(
            document = %key.material_document,
            year = %key.fiscal_year,
            item = %key.item,
            "Goods receipt selected"
        );

        let header = self
            .repository
            .material_document_header(&key.material_document, &key.fiscal_year)
            .await?;
        let line = self
            .repository
            .material_document_item(&key.material_document, &key.fiscal_year, &key.item)
            .await?;
        let document = MaterialDocument::combine(header, line);
        Ok(builder.with_goods_receipt(key, document))
    }

    async fn resolve_country_of_origin(&self, builder: LabelStateBuilder) -> ServiceResult<LabelStateBuilder> {
        let Some(item) = builder.delivery_item() else {
            return Ok(builder);
        };
        let (material, plant) = (item.material.clone(), item.plant.clone());

        let country = match self.repository.product_plant(&material, &plant).await {
            Ok(record) => record
                .country_of_origin
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty()),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        match &country {
            Some(code) => info!(material = %material, plant = %plant, country = %code, "Country of origin found"),
            None => warn!(material = %material, plant = %plant, "No country of origin maintained"),
        }
        Ok(builder.with_country_of_origin(country))
    }

    async fn fetch_handling_units(&self, builder: LabelStateBuilder) -> ServiceResult<LabelStateBuilder> {
        let ibd = builder
            .inbound_delivery()
            .ok_or_else(|| ServiceError::pipeline("Inbound delivery not resolved"))?
            .to_string();
        let missing = || format!("No handling units found for inbound delivery {}", ibd);

        let units = self
            .repository
            .handling_units_for_reference(&ibd, builder.warehouse())
            .await
            .map_err(|e| not_found_as(e, missing()))?;
        let total = units.len();
        let latest = select_latest(units, |hu| hu.created_at);
        if latest.is_empty() {
            return Err(ServiceError::pipeline(missing()));
        }
        info!(ibd = %ibd, total, latest = latest.len(), "Latest handling units selected");
        Ok(builder.with_handling_units(latest))
    }
}

fn not_found_as(err: ServiceError, message: impl Into<String>) -> ServiceError {
    if err.is_not_found() {
        ServiceError::pipeline(message)
    } else {
        err
    }
}

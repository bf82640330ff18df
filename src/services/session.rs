use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::{CountryOfOriginField, OperatorEntries, ResolvedLabelState, ScanInput};
use crate::services::busy::BusyIndicator;
use crate::services::country_of_origin::{CountryRegistry, CountryValidation};
use crate::services::printing::{check_preconditions, LabelPrintService, PrintOutcome};
use crate::services::resolution::{
    should_auto_submit, PipelineStage, ResolutionPipeline, StageTracker,
};

/// One operator at one scanner.
///
/// Holds the typed-in entries and the state of the last scan. All operations
/// take `&mut self`, so a scan and a print on the same session never overlap.
pub struct ScanSession {
    pipeline: ResolutionPipeline,
    printer: LabelPrintService,
    countries: Arc<CountryRegistry>,
    busy: BusyIndicator,
    tracker: StageTracker,
    warehouse: String,
    entries: OperatorEntries,
    state: Option<ResolvedLabelState>,
}

impl ScanSession {
    pub fn new(
        pipeline: ResolutionPipeline,
        printer: LabelPrintService,
        countries: Arc<CountryRegistry>,
        busy: BusyIndicator,
        warehouse: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            printer,
            countries,
            busy,
            tracker: StageTracker::new(),
            warehouse: warehouse.into(),
            entries: OperatorEntries::default(),
            state: None,
        }
    }

    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    pub fn set_warehouse(&mut self, warehouse: impl Into<String>) {
        self.warehouse = warehouse.into();
    }

    pub fn entries(&self) -> &OperatorEntries {
        &self.entries
    }

    pub fn state(&self) -> Option<&ResolvedLabelState> {
        self.state.as_ref()
    }

    pub fn stage(&self) -> PipelineStage {
        self.tracker.current()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Called on every change of the HU field; long enough input is
    /// submitted right away.
    pub async fn on_handling_unit_changed(
        &mut self,
        value: &str,
    ) -> ServiceResult<Option<&ResolvedLabelState>> {
        if !should_auto_submit(value) {
            return Ok(None);
        }
        self.submit_handling_unit(value).await.map(Some)
    }

    pub async fn submit_handling_unit(&mut self, id: &str) -> ServiceResult<&ResolvedLabelState> {
        self.scan(ScanInput::HandlingUnit(id.to_string())).await
    }

    pub async fn submit_inbound_delivery(&mut self, id: &str) -> ServiceResult<&ResolvedLabelState> {
        self.scan(ScanInput::InboundDelivery(id.to_string())).await
    }

    #[instrument(skip(self), fields(warehouse = %self.warehouse))]
    async fn scan(&mut self, scan: ScanInput) -> ServiceResult<&ResolvedLabelState> {
        if self.warehouse.trim().is_empty() {
            return Err(ServiceError::validation("Enter Warehouse"));
        }
        let _busy = self.busy.acquire();

        self.state = None;
        if self.tracker.current() != PipelineStage::Idle && self.tracker.current() != PipelineStage::Ready {
            self.tracker = StageTracker::new();
        }

        let state = self
            .pipeline
            .run_tracked(scan, self.warehouse.trim(), &mut self.tracker)
            .await?;

        if self.entries.country_of_origin.is_replaceable() {
            self.entries.country_of_origin = state
                .country_of_origin
                .as_deref()
                .map(CountryOfOriginField::prefilled)
                .unwrap_or_default();
        }
        Ok(self.state.insert(state))
    }

    pub fn edit_country_of_origin(&mut self, input: &str) -> CountryValidation {
        self.countries.edit(&mut self.entries.country_of_origin, input)
    }

    pub fn set_lot(&mut self, lot: impl Into<String>) {
        self.entries.lot = lot.into();
    }

    pub fn set_label_format(&mut self, format: impl Into<String>) {
        self.entries.label_format = format.into();
    }

    pub fn set_printer(&mut self, printer: impl Into<String>) {
        self.entries.printer = printer.into();
    }

    /// Prints the current state.
    ///
    /// A precondition failure leaves everything in place so the operator can
    /// correct the entry. A dispatch failure drops the resolved state and
    /// requires a new scan; entries are kept. Success clears both.
    pub async fn print(&mut self) -> ServiceResult<PrintOutcome> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ServiceError::validation("Scan a handling unit or inbound delivery first"))?;
        check_preconditions(state, &self.entries)?;

        let _busy = self.busy.acquire();
        self.tracker.advance(PipelineStage::Dispatching)?;

        match self.printer.print(state, &self.entries).await {
            Ok(outcome) => {
                self.tracker.advance(PipelineStage::Idle)?;
                info!(labels = outcome.printed.len(), "Label batch printed");
                self.entries.clear();
                self.state = None;
                Ok(outcome)
            }
            Err(e) => {
                self.tracker.fail_and_reset();
                self.state = None;
                Err(e)
            }
        }
    }

    /// Drops the resolved state and every operator entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.state = None;
        self.tracker = StageTracker::new();
    }
}

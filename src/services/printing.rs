use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::errors::{ServiceError, ServiceResult};
use crate::models::{
    AuditRecord, HandlingUnit, LabelRecord, OperatorEntries, OrderReference, PrintPayload,
    ResolvedLabelState,
};
use crate::services::print_gateway::{AuditStore, PrintGateway};

/// Result of a fully dispatched batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintOutcome {
    /// Handling units sent to the gateway, in dispatch order
    pub printed: Vec<String>,
    pub audited: usize,
    pub audit_failures: usize,
}

/// Checks print preconditions in order and returns the first failure.
pub fn check_preconditions(state: &ResolvedLabelState, entries: &OperatorEntries) -> ServiceResult<()> {
    if state.delivery_item.delivery_document.trim().is_empty() {
        return Err(ServiceError::validation("Inbound Delivery missing"));
    }
    if !state.material_document.has_document_number() {
        return Err(ServiceError::validation("Material Document missing"));
    }
    if state.handling_units.is_empty() {
        return Err(ServiceError::validation("No handling units to print"));
    }
    if !entries.country_of_origin.is_present_and_valid() {
        return Err(ServiceError::validation("Enter a valid Country of Origin"));
    }
    if entries.lot.trim().is_empty() {
        return Err(ServiceError::validation("Enter EI#"));
    }
    Ok(())
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// One label per resolved unit, numbered `"{n} of {total}"`.
pub fn build_labels(state: &ResolvedLabelState, entries: &OperatorEntries) -> Vec<LabelRecord> {
    let total = state.handling_units.len();
    state
        .handling_units
        .iter()
        .enumerate()
        .map(|(index, unit)| build_label(state, entries, unit, format!("{} of {}", index + 1, total)))
        .collect()
}

fn build_label(
    state: &ResolvedLabelState,
    entries: &OperatorEntries,
    unit: &HandlingUnit,
    sequence: String,
) -> LabelRecord {
    let ibd = &state.delivery_item;
    let gr = &state.material_document;
    let unit_item = unit.primary_item();

    let mut label = LabelRecord {
        hu: unit.external_id.clone(),
        barcode: unit.external_id.clone(),
        pack_material: unit.packaging_material.clone(),
        hu_quantity: unit_item
            .and_then(|i| i.quantity.clone())
            .unwrap_or_default(),
        uom: unit_item.map(|i| i.unit.clone()).unwrap_or_default(),
        st_type: unit.storage_type.clone(),
        storage_location: unit.storage_location.clone(),
        storage_bin: unit.storage_bin.clone(),
        delivery: ibd.delivery_document.clone(),
        delivery_item: ibd.delivery_document_item.clone(),
        exp_date: date_text(ibd.expiration_date),
        manufacture_date: date_text(ibd.manufacture_date),
        batch: ibd.batch.clone(),
        int_serialno: unit.internal_id.clone().unwrap_or_default(),
        gr: gr.document_number.clone(),
        gr_qty: gr.quantity_in_base_unit.clone().unwrap_or_default(),
        gr_date: date_text(gr.creation_date),
        co: entries.country_of_origin.value.trim().to_uppercase(),
        ie: entries.lot.trim().to_string(),
        label_format: entries.label_format.trim().to_string(),
        printer: entries.printer.trim().to_string(),
        r#box: sequence,
        ..Default::default()
    };

    match &state.order {
        OrderReference::ProductionOrderBacked(order) => {
            label.product = ibd.material.clone();
            label.prod_desc = ibd.item_text.clone().unwrap_or_default();
            label.prod_order = order.order_id.clone();
            label.prod_order_item = order.order_item.clone();
        }
        OrderReference::PurchaseOrderBacked {
            purchase_order,
            item,
        } => {
            label.product = unit_item
                .map(|i| i.material.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| ibd.material.clone());
            label.prod_desc = item.item_text.clone();
            label.vendor_code = purchase_order.supplier.clone();
            label.stock_category = item.stock_category_flag().to_string();
            label.special_stock = item.special_stock_flag().to_string();
            label.purchase_order = purchase_order.purchase_order.clone();
            label.po_item = item.purchase_order_item.clone();
            label.vendor_part = item.manufacturer_material.clone();
        }
    }
    label
}

/// Validates, dispatches one label per unit and writes the audit trail.
#[derive(Clone)]
pub struct LabelPrintService {
    gateway: Arc<dyn PrintGateway>,
    audit: Option<Arc<dyn AuditStore>>,
}

impl LabelPrintService {
    pub fn new(gateway: Arc<dyn PrintGateway>, audit: Option<Arc<dyn AuditStore>>) -> Self {
        Self { gateway, audit }
    }

    /// Sends every label in order, one call at a time.
    ///
    /// The first rejected unit aborts the batch; labels already accepted are
    /// not withdrawn. The audit trail is only written after the whole batch
    /// went through and never affects the result.
    #[instrument(skip(self, state, entries), fields(ibd = %state.inbound_delivery))]
    pub async fn print(
        &self,
        state: &ResolvedLabelState,
        entries: &OperatorEntries,
    ) -> ServiceResult<PrintOutcome> {
        check_preconditions(state, entries)?;
        let labels = build_labels(state, entries);

        let mut printed = Vec::with_capacity(labels.len());
        for label in &labels {
            let payload = PrintPayload::from(label.clone());
            if let Err(e) = self.gateway.submit(&payload).await {
                error!(hu = %label.hu, sequence = %label.r#box, error = %e, "Label dispatch failed");
                let reason = match e {
                    ServiceError::PrintGatewayError(msg) => msg,
                    other => other.to_string(),
                };
                return Err(ServiceError::PrintGatewayError(format!(
                    "HU {}: {}",
                    label.hu, reason
                )));
            }
            info!(hu = %label.hu, sequence = %label.r#box, "Label dispatched");
            printed.push(label.hu.clone());
        }

        let (audited, audit_failures) = self.write_audit(&labels).await;
        Ok(PrintOutcome {
            printed,
            audited,
            audit_failures,
        })
    }

    async fn write_audit(&self, labels: &[LabelRecord]) -> (usize, usize) {
        let Some(store) = &self.audit else {
            return (0, 0);
        };
        let mut written = 0;
        let mut failed = 0;
        for label in labels {
            let record = AuditRecord::from_label(label);
            match store.record(&record).await {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    warn!(hu = %label.hu, id = %record.id, error = %e, "Audit write failed");
                }
            }
        }
        (written, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderReference, ProductionOrderRef};
    use crate::services::fixtures;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use mockall::{mock, Sequence};

    mock! {
        pub Gateway {}
        #[async_trait]
        impl PrintGateway for Gateway {
            async fn submit(&self, payload: &PrintPayload) -> ServiceResult<()>;
        }
    }

    mock! {
        pub Audit {}
        #[async_trait]
        impl AuditStore for Audit {
            async fn record(&self, record: &AuditRecord) -> ServiceResult<()>;
        }
    }

    #[test]
    fn po_labels_carry_order_fields_and_sequence() {
        let labels = build_labels(&fixtures::resolved_state(2), &fixtures::operator_entries());
        assert_eq!(labels.len(), 2);

        let first = &labels[0];
        assert_eq!(first.hu, "100000000001");
        assert_eq!(first.barcode, first.hu);
        assert_eq!(first.r#box, "1 of 2");
        assert_eq!(labels[1].r#box, "2 of 2");
        assert_eq!(first.product, "MAT-100");
        assert_eq!(first.prod_desc, "Hex bolt M8 x 40");
        assert_eq!(first.purchase_order, fixtures::PO);
        assert_eq!(first.vendor_code, "V-20001");
        assert_eq!(first.stock_category, "X");
        assert_eq!(first.special_stock, "K");
        assert_eq!(first.prod_order, "");
        assert_eq!(first.gr, "5000000042");
        assert_eq!(first.gr_date, "2026-03-02");
        assert_eq!(first.exp_date, "2028-02-29");
        assert_eq!(first.co, "DE");
        assert_eq!(first.ie, "EI-7781");
    }

    #[test]
    fn production_labels_leave_po_fields_empty() {
        let mut state = fixtures::resolved_state(1);
        state.order = OrderReference::ProductionOrderBacked(ProductionOrderRef {
            order_id: "1000456".into(),
            order_item: "0001".into(),
        });

        let label = &build_labels(&state, &fixtures::operator_entries())[0];
        assert_eq!(label.product, "MAT-100");
        assert_eq!(label.prod_desc, "Hex bolt M8 zinc");
        assert_eq!(label.prod_order, "1000456");
        assert_eq!(label.prod_order_item, "0001");
        assert_eq!(label.purchase_order, "");
        assert_eq!(label.po_item, "");
        assert_eq!(label.vendor_code, "");
        assert_eq!(label.stock_category, "");
    }

    #[test]
    fn preconditions_report_first_failure() {
        let state = fixtures::resolved_state(1);
        let mut entries = fixtures::operator_entries();
        entries.lot.clear();
        entries.country_of_origin.valid = false;

        let err = check_preconditions(&state, &entries).unwrap_err();
        assert_eq!(err.to_string(), "Enter a valid Country of Origin");

        entries.country_of_origin.valid = true;
        let err = check_preconditions(&state, &entries).unwrap_err();
        assert_eq!(err.to_string(), "Enter EI#");

        let mut state = state;
        state.material_document.document_number.clear();
        let err = check_preconditions(&state, &entries).unwrap_err();
        assert_eq!(err.to_string(), "Material Document missing");
    }

    #[tokio::test]
    async fn dispatches_sequentially_and_stops_on_failure() {
        let mut gateway = MockGateway::new();
        let mut seq = Sequence::new();
        gateway
            .expect_submit()
            .withf(|p| p.order_hu.r#box == "1 of 3")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        gateway
            .expect_submit()
            .withf(|p| p.order_hu.r#box == "2 of 3")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ServiceError::PrintGatewayError("paper out".into())));

        let mut audit = MockAudit::new();
        audit.expect_record().times(0);

        let service = LabelPrintService::new(Arc::new(gateway), Some(Arc::new(audit)));
        let err = service
            .print(&fixtures::resolved_state(3), &fixtures::operator_entries())
            .await
            .unwrap_err();

        assert_matches!(err, ServiceError::PrintGatewayError(msg) if msg == "HU 100000000002: paper out");
    }

    #[tokio::test]
    async fn three_units_three_calls_in_order() {
        let mut gateway = MockGateway::new();
        let mut seq = Sequence::new();
        for n in 1..=3 {
            let expected = format!("{} of 3", n);
            gateway
                .expect_submit()
                .withf(move |p| p.order_hu.r#box == expected)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let service = LabelPrintService::new(Arc::new(gateway), None);
        let outcome = service
            .print(&fixtures::resolved_state(3), &fixtures::operator_entries())
            .await
            .unwrap();

        assert_eq!(
            outcome.printed,
            vec!["100000000001", "100000000002", "100000000003"]
        );
        assert_eq!(outcome.audited, 0);
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_the_batch() {
        let mut gateway = MockGateway::new();
        gateway.expect_submit().times(2).returning(|_| Ok(()));

        let mut audit = MockAudit::new();
        let mut calls = 0;
        audit.expect_record().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ServiceError::transport("audit table locked"))
            } else {
                Ok(())
            }
        });

        let service = LabelPrintService::new(Arc::new(gateway), Some(Arc::new(audit)));
        let outcome = service
            .print(&fixtures::resolved_state(2), &fixtures::operator_entries())
            .await
            .unwrap();

        assert_eq!(outcome.printed.len(), 2);
        assert_eq!(outcome.audited, 1);
        assert_eq!(outcome.audit_failures, 1);
    }

    #[tokio::test]
    async fn invalid_entries_never_reach_the_gateway() {
        let mut gateway = MockGateway::new();
        gateway.expect_submit().times(0);

        let mut entries = fixtures::operator_entries();
        entries.lot = "  ".into();

        let service = LabelPrintService::new(Arc::new(gateway), None);
        let err = service
            .print(&fixtures::resolved_state(1), &entries)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}

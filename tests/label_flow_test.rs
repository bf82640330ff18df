mod common;

use assert_matches::assert_matches;
use inbound_label::{
    errors::ServiceError,
    repositories::{DocumentKey, DocumentKind},
    services::PipelineStage,
};

use common::{TestApp, GR_DOC, HU_1, HU_2, IBD, PO, WAREHOUSE};

#[tokio::test]
async fn handling_unit_scan_resolves_and_prints_latest_cohort() {
    let app = TestApp::new();
    let mut session = app.state.session();

    let state = session.submit_handling_unit(HU_1).await.unwrap();
    assert_eq!(state.inbound_delivery, IBD);
    assert_eq!(state.material_document.document_number, GR_DOC);
    assert_eq!(state.country_of_origin.as_deref(), Some("DE"));
    let units: Vec<_> = state
        .handling_units
        .iter()
        .map(|u| u.external_id.as_str())
        .collect();
    assert_eq!(units, vec![HU_1, HU_2]);
    assert_eq!(session.stage(), PipelineStage::Ready);
    assert!(session.entries().country_of_origin.valid);

    session.set_lot("EI-7781");
    session.set_label_format("LBL-4X6");
    session.set_printer("PRN-07");
    let outcome = session.print().await.unwrap();

    assert_eq!(outcome.printed, vec![HU_1.to_string(), HU_2.to_string()]);
    let sent = app.gateway.sent();
    assert_eq!(sent[0].order_hu.r#box, "1 of 2");
    assert_eq!(sent[1].order_hu.r#box, "2 of 2");
    assert_eq!(sent[0].order_hu.purchase_order, PO);
    assert_eq!(sent[0].order_hu.co, "DE");
    assert_eq!(sent[0].order_hu.ie, "EI-7781");

    assert!(session.state().is_none());
    assert_eq!(session.entries().lot, "");
    assert_eq!(session.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn remote_lookups_follow_pipeline_order() {
    let app = TestApp::new();
    let mut session = app.state.session();
    session.submit_handling_unit(HU_1).await.unwrap();

    let kinds: Vec<DocumentKind> = app.repository.calls().iter().map(DocumentKey::kind).collect();
    assert_eq!(
        kinds,
        vec![
            DocumentKind::HandlingUnit,
            DocumentKind::InboundDelivery,
            DocumentKind::PurchaseOrder,
            DocumentKind::DocumentFlow,
            DocumentKind::MaterialDocumentHeader,
            DocumentKind::MaterialDocumentItem,
            DocumentKind::ProductPlant,
            DocumentKind::HandlingUnit,
        ]
    );
    assert_matches!(
        app.repository.calls().last(),
        Some(DocumentKey::HandlingUnitsByReference { reference_document, warehouse })
            if reference_document == IBD && warehouse == WAREHOUSE
    );
}

#[tokio::test]
async fn production_delivery_skips_purchase_order() {
    let app = TestApp::with_repository(common::seeded_repository("ZPRD"));
    let mut session = app.state.session();

    let state = session.submit_inbound_delivery(IBD).await.unwrap();
    assert!(state.is_production_order());
    assert!(!app
        .repository
        .calls()
        .iter()
        .any(|key| key.kind() == DocumentKind::PurchaseOrder));

    session.set_lot("EI-1");
    session.print().await.unwrap();
    let label = &app.gateway.sent()[0].order_hu;
    assert_eq!(label.prod_order, "1000456");
    assert_eq!(label.purchase_order, "");
    assert_eq!(label.product, "MAT-100");
}

#[tokio::test]
async fn auto_submit_waits_for_full_identifier() {
    let app = TestApp::new();
    let mut session = app.state.session();

    assert!(session.on_handling_unit_changed("10000").await.unwrap().is_none());
    assert!(app.repository.calls().is_empty());

    let state = session.on_handling_unit_changed(HU_1).await.unwrap();
    assert!(state.is_some());
}

#[tokio::test]
async fn unavailable_material_documents_abort_the_scan() {
    let app = TestApp::new();
    app.repository
        .make_unavailable(DocumentKind::MaterialDocumentHeader);
    let mut session = app.state.session();

    let err = session.submit_inbound_delivery(IBD).await.unwrap_err();
    assert_matches!(err, ServiceError::TransportError(_));
    assert!(session.state().is_none());
    assert_eq!(session.stage(), PipelineStage::Idle);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn rejected_unit_stops_the_batch() {
    let app = TestApp::new();
    app.gateway.reject_unit(HU_2);
    let mut session = app.state.session();
    session.submit_inbound_delivery(IBD).await.unwrap();
    session.set_lot("EI-7781");

    let err = session.print().await.unwrap_err();
    assert_matches!(err, ServiceError::PrintGatewayError(ref msg) if msg.contains(HU_2));
    assert_eq!(app.gateway.printed_units(), vec![HU_1.to_string()]);
    assert!(session.state().is_none());
    assert_eq!(session.entries().lot, "EI-7781");
}

#[tokio::test]
async fn invalid_country_blocks_printing() {
    let app = TestApp::new();
    let mut session = app.state.session();
    session.submit_inbound_delivery(IBD).await.unwrap();
    session.set_lot("EI-7781");

    let result = session.edit_country_of_origin("zz");
    assert!(!result.is_valid());

    let err = session.print().await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(ref msg) if msg == "Enter a valid Country of Origin");
    assert!(app.gateway.sent().is_empty());
    assert!(session.state().is_some());
}

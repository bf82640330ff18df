//! Record-selection policies used by the resolution pipeline.
//!
//! Each policy is a named function so the rules can be exercised on their
//! own: the latest-record selector, the latest goods-receipt rule, the
//! item-number repair and the first-item policies.

use tracing::warn;

use crate::models::{
    DocumentFlowEntry, GoodsReceiptKey, InboundDeliveryItem, PurchaseOrder, PurchaseOrderItem,
};

/// Item number used when the flow entry carries none.
const DEFAULT_ITEM_NUMBER: &str = "000001";
const SIGNIFICANT_ITEM_DIGITS: usize = 4;

/// Keeps every record whose timestamp equals the maximum, in input order.
///
/// Several units can share one creation instant; all of them are returned.
/// Empty input yields empty output.
pub fn select_latest<T, K, F>(records: Vec<T>, timestamp: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let Some(latest) = records.iter().map(&timestamp).max() else {
        return Vec::new();
    };
    records
        .into_iter()
        .filter(|record| timestamp(record) == latest)
        .collect()
}

/// Document-flow entries that point at a goods-receipt material document.
pub fn goods_receipt_entries(entries: &[DocumentFlowEntry]) -> Vec<&DocumentFlowEntry> {
    entries.iter().filter(|e| e.is_goods_receipt()).collect()
}

/// Latest goods receipt: among `R` entries, the numerically largest subsequent
/// document. On equal keys the first one encountered wins.
pub fn select_latest_goods_receipt(entries: &[DocumentFlowEntry]) -> Option<&DocumentFlowEntry> {
    goods_receipt_entries(entries)
        .into_iter()
        .filter_map(|entry| match entry.subsequent_document_number() {
            Some(number) => Some((number, entry)),
            None => {
                warn!(
                    document = %entry.subsequent_document,
                    "Skipping goods receipt with non-numeric document number"
                );
                None
            }
        })
        .fold(None, |best: Option<(u64, &DocumentFlowEntry)>, candidate| match best {
            Some((number, _)) if candidate.0 <= number => best,
            _ => Some(candidate),
        })
        .map(|(_, entry)| entry)
}

/// Keeps the last four characters of a raw item number.
///
/// Six-digit values such as `"000123"` become `"0123"`; shorter values are
/// returned as they are, never padded. A missing value falls back to `0001`.
pub fn repair_item_number(raw: Option<&str>) -> String {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_ITEM_NUMBER);
    let len = raw.chars().count();
    raw.chars()
        .skip(len.saturating_sub(SIGNIFICANT_ITEM_DIGITS))
        .collect()
}

/// Material-document key of a goods-receipt entry, with the item repaired and
/// the fiscal year defaulted to `current_year` when absent.
pub fn goods_receipt_key(entry: &DocumentFlowEntry, current_year: i32) -> GoodsReceiptKey {
    GoodsReceiptKey {
        material_document: entry.subsequent_document.trim().to_string(),
        fiscal_year: entry
            .subsequent_document_year
            .clone()
            .unwrap_or_else(|| current_year.to_string()),
        item: repair_item_number(entry.subsequent_document_item.as_deref()),
    }
}

/// First-item policy: a delivery is represented by its first line.
///
/// Multi-line deliveries are not split per line.
pub fn representative_delivery_item(items: Vec<InboundDeliveryItem>) -> Option<InboundDeliveryItem> {
    items.into_iter().next()
}

/// First-item policy for purchase orders.
pub fn representative_purchase_order_item(order: &PurchaseOrder) -> Option<&PurchaseOrderItem> {
    order.items.first()
}

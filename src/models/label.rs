use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Longest string the audit table accepts per column.
pub const AUDIT_FIELD_LIMIT: usize = 20;

/// One label as understood by the print gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    #[serde(rename = "HU")]
    pub hu: String,
    pub barcode: String,
    #[serde(rename = "Pack_Material")]
    pub pack_material: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Prod_Desc")]
    pub prod_desc: String,
    #[serde(rename = "Hu_Quantity")]
    pub hu_quantity: String,
    #[serde(rename = "Uom")]
    pub uom: String,
    #[serde(rename = "St_Type")]
    pub st_type: String,
    #[serde(rename = "Storage_Location")]
    pub storage_location: String,
    #[serde(rename = "Storage_Bin")]
    pub storage_bin: String,
    #[serde(rename = "Vendor_Code")]
    pub vendor_code: String,
    #[serde(rename = "Delivery")]
    pub delivery: String,
    #[serde(rename = "Delivery_Item")]
    pub delivery_item: String,
    #[serde(rename = "Exp_date")]
    pub exp_date: String,
    #[serde(rename = "Manufacture_date")]
    pub manufacture_date: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Stock_Category")]
    pub stock_category: String,
    #[serde(rename = "Special_stock")]
    pub special_stock: String,
    #[serde(rename = "Purchase_Order")]
    pub purchase_order: String,
    #[serde(rename = "PO_Item")]
    pub po_item: String,
    #[serde(rename = "Vendor_Part")]
    pub vendor_part: String,
    #[serde(rename = "Prod_Order")]
    pub prod_order: String,
    #[serde(rename = "Prod_Order_Item")]
    pub prod_order_item: String,
    #[serde(rename = "Int_Serialno")]
    pub int_serialno: String,
    #[serde(rename = "GR")]
    pub gr: String,
    #[serde(rename = "GR_Qty")]
    pub gr_qty: String,
    #[serde(rename = "GR_Date")]
    pub gr_date: String,
    #[serde(rename = "CO")]
    pub co: String,
    /// Lot / EI number
    #[serde(rename = "IE")]
    pub ie: String,
    #[serde(rename = "Label_Format")]
    pub label_format: String,
    #[serde(rename = "Printer")]
    pub printer: String,
    /// `"{n} of {total}"`
    #[serde(rename = "Box")]
    pub r#box: String,
}

/// Request body of the print gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintPayload {
    #[serde(rename = "Order_HU")]
    pub order_hu: LabelRecord,
}

impl From<LabelRecord> for PrintPayload {
    fn from(order_hu: LabelRecord) -> Self {
        Self { order_hu }
    }
}

/// Row written to the audit store after a successful print
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "HU")]
    pub hu: String,
    #[serde(rename = "Pack_material")]
    pub pack_material: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Prod_Desc")]
    pub prod_desc: String,
    #[serde(rename = "Hu_Quantity")]
    pub hu_quantity: String,
    #[serde(rename = "Uom")]
    pub uom: String,
    #[serde(rename = "St_Type")]
    pub st_type: String,
    #[serde(rename = "Storage_Loc")]
    pub storage_location: String,
    #[serde(rename = "Storage_bin")]
    pub storage_bin: String,
    #[serde(rename = "Vendor_Code")]
    pub vendor_code: String,
    #[serde(rename = "Delivery")]
    pub delivery: String,
    #[serde(rename = "Delivery_Item")]
    pub delivery_item: String,
    #[serde(rename = "Exp_date")]
    pub exp_date: String,
    #[serde(rename = "Mfg_date")]
    pub manufacture_date: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Stock_Category")]
    pub stock_category: String,
    #[serde(rename = "Special_stock")]
    pub special_stock: String,
    #[serde(rename = "Purchase_Order")]
    pub purchase_order: String,
    #[serde(rename = "PO_Item")]
    pub po_item: String,
    #[serde(rename = "Vendor_Part")]
    pub vendor_part: String,
    #[serde(rename = "Prod_Order")]
    pub prod_order: String,
    #[serde(rename = "Prod_Order_Item")]
    pub prod_order_item: String,
    #[serde(rename = "GR")]
    pub gr: String,
    #[serde(rename = "GR_Qty")]
    pub gr_qty: String,
    #[serde(rename = "GR_Date")]
    pub gr_date: String,
    #[serde(rename = "CO")]
    pub co: String,
    #[serde(rename = "IE")]
    pub ie: String,
    #[serde(rename = "Label_format")]
    pub label_format: String,
    #[serde(rename = "Printer")]
    pub printer: String,
    #[serde(rename = "Box")]
    pub r#box: String,
}

impl AuditRecord {
    /// Maps a printed label onto the audit schema under a fresh id,
    /// truncating every column to [`AUDIT_FIELD_LIMIT`] characters.
    pub fn from_label(label: &LabelRecord) -> Self {
        let fit = |column: &str, value: &str| truncate_field(&label.hu, column, value);
        Self {
            id: Uuid::new_v4(),
            hu: fit("HU", &label.hu),
            pack_material: fit("Pack_material", &label.pack_material),
            product: fit("Product", &label.product),
            prod_desc: fit("Prod_Desc", &label.prod_desc),
            hu_quantity: fit("Hu_Quantity", &label.hu_quantity),
            uom: fit("Uom", &label.uom),
            st_type: fit("St_Type", &label.st_type),
            storage_location: fit("Storage_Loc", &label.storage_location),
            storage_bin: fit("Storage_bin", &label.storage_bin),
            vendor_code: fit("Vendor_Code", &label.vendor_code),
            delivery: fit("Delivery", &label.delivery),
            delivery_item: fit("Delivery_Item", &label.delivery_item),
            exp_date: fit("Exp_date", &label.exp_date),
            manufacture_date: fit("Mfg_date", &label.manufacture_date),
            batch: fit("Batch", &label.batch),
            stock_category: fit("Stock_Category", &label.stock_category),
            special_stock: fit("Special_stock", &label.special_stock),
            purchase_order: fit("Purchase_Order", &label.purchase_order),
            po_item: fit("PO_Item", &label.po_item),
            vendor_part: fit("Vendor_Part", &label.vendor_part),
            prod_order: fit("Prod_Order", &label.prod_order),
            prod_order_item: fit("Prod_Order_Item", &label.prod_order_item),
            gr: fit("GR", &label.gr),
            gr_qty: fit("GR_Qty", &label.gr_qty),
            gr_date: fit("GR_Date", &label.gr_date),
            co: fit("CO", &label.co),
            ie: fit("IE", &label.ie),
            label_format: fit("Label_format", &label.label_format),
            printer: fit("Printer", &label.printer),
            r#box: fit("Box", &label.r#box),
        }
    }
}

fn truncate_field(hu: &str, column: &str, value: &str) -> String {
    if value.chars().count() <= AUDIT_FIELD_LIMIT {
        return value.to_string();
    }
    warn!(
        hu = %hu,
        column = column,
        limit = AUDIT_FIELD_LIMIT,
        "Audit value truncated: '{}'",
        value
    );
    value.chars().take(AUDIT_FIELD_LIMIT).collect()
}
